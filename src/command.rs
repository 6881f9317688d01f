use crate::store::KeyValueStore;

/// A request understood by the key/value server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { key: String, value: String },
    Get { key: String },
    Remove { key: String },
    Print,
    /// A malformed request, carrying the reply that explains why.
    Invalid(String),
}

impl Command {
    /// Parses one request. The command word is case-insensitive and
    /// arguments are separated by spaces.
    pub fn parse(text: &str) -> Self {
        if text.trim().is_empty() {
            return Command::Invalid("ERROR: Empty command".to_string());
        }

        let tokens: Vec<&str> = text.split(' ').filter(|t| !t.is_empty()).collect();
        let Some((word, args)) = tokens.split_first() else {
            return Command::Invalid("Invalid command".to_string());
        };

        match (word.to_ascii_uppercase().as_str(), args) {
            ("SET", [key, value]) => Command::Set {
                key: key.to_string(),
                value: value.to_string(),
            },
            ("SET", _) => Command::Invalid(
                "ERROR: SET command requires exactly 2 arguments (key, value)\n".to_string(),
            ),
            ("GET", [key]) => Command::Get {
                key: key.to_string(),
            },
            ("GET", _) => Command::Invalid(
                "ERROR: GET command requires exactly 1 argument (key)\n".to_string(),
            ),
            ("REMOVE", [key]) => Command::Remove {
                key: key.to_string(),
            },
            ("REMOVE", _) => Command::Invalid(
                "ERROR: REMOVE command requires exactly 1 argument (key)\n".to_string(),
            ),
            ("PRINT", _) => Command::Print,
            (other, _) => Command::Invalid(format!("Unknown command: {}\n", other)),
        }
    }

    pub fn execute(self, store: &mut KeyValueStore) -> String {
        match self {
            Command::Set { key, value } => store.set(&key, &value),
            Command::Get { key } => store.get(&key),
            Command::Remove { key } => store.remove(&key),
            Command::Print => store.print(),
            Command::Invalid(reply) => reply,
        }
    }
}

/// Parses `text` and runs it against `store`, returning the reply.
pub fn execute(store: &mut KeyValueStore, text: &str) -> String {
    Command::parse(text).execute(store)
}
