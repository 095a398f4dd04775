pub mod appointment;
pub mod availability;
pub mod call_state;
pub mod conversation;

pub use appointment::AppointmentDetails;
pub use availability::{AvailabilityResult, TimeSlot};
pub use call_state::{Action, State, STATE_ORDER};
pub use conversation::{CallData, CallDataPatch, ConversationState};
