//! Interaction wire types and the slash-command catalog

use serde::{Deserialize, Serialize};
use serde_json::Value;

// Interaction types
pub const INTERACTION_PING: u8 = 1;
pub const INTERACTION_APPLICATION_COMMAND: u8 = 2;
pub const INTERACTION_AUTOCOMPLETE: u8 = 4;

// Interaction callback types
pub const CALLBACK_PONG: u8 = 1;
pub const CALLBACK_DEFERRED_CHANNEL_MESSAGE: u8 = 5;
pub const CALLBACK_AUTOCOMPLETE_RESULT: u8 = 8;

// Application command option types
pub const OPTION_STRING: u8 = 3;
pub const OPTION_INTEGER: u8 = 4;

/// One incoming interaction POST
#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub kind: u8,
    pub id: String,
    pub token: String,
    pub data: Option<InteractionData>,
    pub member: Option<Member>,
    pub user: Option<User>,
}

impl Interaction {
    /// The invoking user's snowflake; guild invocations nest it under `member`
    pub fn user_id(&self) -> Option<&str> {
        self.member
            .as_ref()
            .map(|m| m.user.id.as_str())
            .or_else(|| self.user.as_ref().map(|u| u.id.as_str()))
    }
}

/// Command payload of an interaction
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionData {
    pub name: String,
    #[serde(default)]
    pub options: Vec<InteractionOption>,
}

impl InteractionData {
    /// String option by name
    pub fn option_str(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.value.as_ref())
            .and_then(Value::as_str)
    }

    /// Integer option by name
    pub fn option_i64(&self, name: &str) -> Option<i64> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.value.as_ref())
            .and_then(Value::as_i64)
    }

    /// The option the user is currently typing into, if any
    pub fn focused_option(&self) -> Option<&InteractionOption> {
        self.options.iter().find(|o| o.focused)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionOption {
    pub name: String,
    pub value: Option<Value>,
    #[serde(default)]
    pub focused: bool,
}

impl InteractionOption {
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_ref().and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
}

/// Registration payload for one slash command
#[derive(Debug, Clone, Serialize)]
pub struct CommandSpec {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandOption {
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: String,
    pub description: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub autocomplete: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Choice {
    pub name: String,
    pub value: String,
}

impl Choice {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

fn ticker_option() -> CommandOption {
    CommandOption {
        kind: OPTION_STRING,
        name: "ticker".to_string(),
        description: "Stock ticker symbol".to_string(),
        required: true,
        choices: Vec::new(),
        autocomplete: false,
    }
}

fn period_option() -> CommandOption {
    CommandOption {
        kind: OPTION_STRING,
        name: "period".to_string(),
        description: "Reporting period".to_string(),
        required: false,
        choices: vec![
            Choice::new("Annual", "annual"),
            Choice::new("Quarter", "quarter"),
        ],
        autocomplete: false,
    }
}

fn statement_command(name: &str, description: &str) -> CommandSpec {
    CommandSpec {
        name: name.to_string(),
        description: description.to_string(),
        options: vec![ticker_option(), period_option()],
    }
}

/// Every command the bot registers with Discord
pub fn command_catalog() -> Vec<CommandSpec> {
    vec![
        CommandSpec {
            name: "candle".to_string(),
            description: "Candlestick chart for a ticker".to_string(),
            options: vec![
                ticker_option(),
                CommandOption {
                    kind: OPTION_STRING,
                    name: "interval".to_string(),
                    description: "Chart interval".to_string(),
                    required: false,
                    choices: vec![
                        Choice::new("Daily", "1day"),
                        Choice::new("15 minutes", "15min"),
                        Choice::new("5 minutes", "5min"),
                    ],
                    autocomplete: false,
                },
                CommandOption {
                    kind: OPTION_INTEGER,
                    name: "days".to_string(),
                    description: "How many days back to chart".to_string(),
                    required: false,
                    choices: Vec::new(),
                    autocomplete: false,
                },
            ],
        },
        CommandSpec {
            name: "cd".to_string(),
            description: "Quick daily candlestick chart".to_string(),
            options: vec![ticker_option()],
        },
        statement_command("income", "Latest income statement for a ticker"),
        statement_command("cashflow", "Latest cash flow statement for a ticker"),
        statement_command("balance", "Latest balance sheet for a ticker"),
        CommandSpec {
            name: "sec".to_string(),
            description: "Latest SEC filings for a ticker".to_string(),
            options: vec![
                ticker_option(),
                CommandOption {
                    kind: OPTION_STRING,
                    name: "type".to_string(),
                    description: "Filing form type".to_string(),
                    required: false,
                    choices: Vec::new(),
                    autocomplete: true,
                },
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_interaction_parses_guild_invocation() {
        let raw = json!({
            "type": 2,
            "id": "123",
            "token": "tok",
            "member": {"user": {"id": "42"}},
            "data": {
                "name": "candle",
                "options": [
                    {"name": "ticker", "value": "AAPL"},
                    {"name": "days", "value": 90},
                ],
            },
        });
        let interaction: Interaction = serde_json::from_value(raw).unwrap();
        assert_eq!(interaction.kind, INTERACTION_APPLICATION_COMMAND);
        assert_eq!(interaction.user_id(), Some("42"));
        let data = interaction.data.unwrap();
        assert_eq!(data.option_str("ticker"), Some("AAPL"));
        assert_eq!(data.option_i64("days"), Some(90));
        assert_eq!(data.option_str("interval"), None);
    }

    #[test]
    fn test_interaction_dm_user_id() {
        let raw = json!({
            "type": 1,
            "id": "1",
            "token": "tok",
            "user": {"id": "7"},
        });
        let interaction: Interaction = serde_json::from_value(raw).unwrap();
        assert_eq!(interaction.user_id(), Some("7"));
    }

    #[test]
    fn test_focused_option() {
        let raw = json!({
            "type": 4,
            "id": "1",
            "token": "tok",
            "data": {
                "name": "sec",
                "options": [
                    {"name": "ticker", "value": "AAPL"},
                    {"name": "type", "value": "10", "focused": true},
                ],
            },
        });
        let interaction: Interaction = serde_json::from_value(raw).unwrap();
        let data = interaction.data.unwrap();
        let focused = data.focused_option().unwrap();
        assert_eq!(focused.name, "type");
        assert_eq!(focused.as_str(), Some("10"));
    }

    #[test]
    fn test_catalog_names() {
        let names: Vec<String> = command_catalog().into_iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec!["candle", "cd", "income", "cashflow", "balance", "sec"]
        );
    }

    #[test]
    fn test_catalog_serializes_sparse() {
        let specs = command_catalog();
        let sec = specs.iter().find(|c| c.name == "sec").unwrap();
        let value = serde_json::to_value(sec).unwrap();
        let options = value["options"].as_array().unwrap();
        // required ticker has no autocomplete key, filing type does
        assert!(options[0].get("autocomplete").is_none());
        assert_eq!(options[1]["autocomplete"], json!(true));
    }
}
