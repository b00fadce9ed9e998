//! tool3rd core: pure UI state projection of the worker's reports and the
//! user's intents.
mod catalogue;
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use catalogue::{CatalogueSeries, CatalogueSpec};
pub use effect::Effect;
pub use msg::Msg;
pub use state::{AppState, Notification, NotificationAction, NotificationId};
pub use update::update;
pub use view_model::{AppViewModel, QueueRowView, ResourceRowView};
