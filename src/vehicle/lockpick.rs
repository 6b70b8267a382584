//! Lockpick Alerts
//!
//! Anonymous police tip sent when a lockpick attempt happens outside a heist
//! zone. `{zone}` and `{model}` in the alert lines are filled with the zone
//! label and the vehicle's name.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::network::protocol::{LockpickKind, SocietyMessage, SocietyMessageInfo};

/// Zone code where lockpicking is part of a scripted heist.
pub const HEIST_ZONE: &str = "ISHEIST";

/// Phone number alerts are sent to.
pub const POLICE_NUMBER: &str = "555-POLICE";

const ALERTS_ALL: &[&str] = &[
    "Someone is breaking into a {model} near {zone}.",
    "A suspicious person is tampering with a {model} at {zone}.",
];

const ALERTS_LOCKPICK: &[&str] = &[
    "I just saw someone picking the door lock of a {model} at {zone}.",
];

const ALERTS_SLIMJIM: &[&str] = &[
    "Someone slid a tool down the window of a {model} near {zone}.",
];

const ALERTS_ELECTRONIC: &[&str] = &[
    "A guy with some electronic box just opened a {model} at {zone}.",
];

/// Alert lines a given tool can trigger: the shared lines first.
pub fn alert_lines(kind: LockpickKind) -> Vec<&'static str> {
    let specific = match kind {
        LockpickKind::Lockpick => ALERTS_LOCKPICK,
        LockpickKind::Slimjim => ALERTS_SLIMJIM,
        LockpickKind::Electronic => ALERTS_ELECTRONIC,
    };

    ALERTS_ALL.iter().chain(specific.iter()).copied().collect()
}

/// Build the society message for one alert line.
pub fn society_message(line: &str, zone: &str, model: &str) -> SocietyMessage {
    let message = line.replace("{zone}", zone).replace("{model}", model);
    let html_message = line
        .replace("{zone}", &format!("<span {{class}}>{}</span>", zone))
        .replace("{model}", &format!("<span {{class}}>{}</span>", model));

    SocietyMessage {
        anonymous: true,
        number: POLICE_NUMBER.to_string(),
        message,
        html_message,
        position: true,
        info: SocietyMessageInfo { kind: "auto-theft".to_string() },
        override_identifier: "System".to_string(),
    }
}

/// Pick a random alert line for `kind` and build its message.
pub fn random_alert<R: Rng + ?Sized>(rng: &mut R, kind: LockpickKind, zone: &str, model: &str) -> SocietyMessage {
    let lines = alert_lines(kind);
    // Never empty: the shared lines are always present.
    let line = lines.choose(rng).copied().unwrap_or(ALERTS_ALL[0]);
    society_message(line, zone, model)
}

/// Unique event id for a society message.
pub fn society_event_id() -> String {
    format!("phone:sendSocietyMessage:{}", uuid::Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_alert_lines_include_shared() {
        let lines = alert_lines(LockpickKind::Slimjim);
        assert_eq!(lines.len(), ALERTS_ALL.len() + ALERTS_SLIMJIM.len());
        assert!(lines.contains(&ALERTS_ALL[0]));
        assert!(!lines.contains(&ALERTS_ELECTRONIC[0]));
    }

    #[test]
    fn test_message_placeholders() {
        let message = society_message("A {model} at {zone}.", "Vinewood", "Adder");

        assert_eq!(message.message, "A Adder at Vinewood.");
        assert_eq!(
            message.html_message,
            "A <span {class}>Adder</span> at <span {class}>Vinewood</span>."
        );
        assert_eq!(message.number, "555-POLICE");
        assert!(message.anonymous);
        assert_eq!(message.info.kind, "auto-theft");
    }

    #[test]
    fn test_random_alert_is_from_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let message = random_alert(&mut rng, LockpickKind::Electronic, "Z", "M");
            assert!(!message.message.contains('{'));
            assert!(message.message.contains('Z') && message.message.contains('M'));
        }
    }

    #[test]
    fn test_event_ids_unique() {
        let a = society_event_id();
        let b = society_event_id();
        assert!(a.starts_with("phone:sendSocietyMessage:"));
        assert_ne!(a, b);
    }
}
