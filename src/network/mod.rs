//! Network Layer
//!
//! Bus event vocabulary and the outbound event bus. The transport is the
//! host runtime's; this layer only names and encodes what crosses it.

pub mod protocol;
pub mod bus;

pub use protocol::{
    ClientEvent, ServerEvent, LocalEvent, RpcServerEvent,
    LockpickKind, TrunkContext, SocietyMessage, SocietyMessageInfo,
};
pub use bus::{EventBus, ChannelEventBus};
