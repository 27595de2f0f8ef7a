mod progress;
mod store;
mod view;
mod workflow;

// Public API of the interview session subsystem.
pub use progress::{Affordances, InterviewPhase, InterviewView};
pub use store::{BusyFlags, SessionStore, StoreSnapshot};
pub use view::{SessionListItem, SessionReader, SessionReport};
pub use workflow::{InterviewController, RoundOutcome};
