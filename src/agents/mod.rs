pub mod handler;
pub mod messages;
pub mod supervisor;
pub mod travel_agent;
pub mod weather_agent;

pub use handler::{Handler, HandlerId};
pub use messages::ConversationMessage;
pub use supervisor::{route, RouterDecision, Supervisor};
pub use travel_agent::TravelInformationAgent;
pub use weather_agent::WeatherAgent;
