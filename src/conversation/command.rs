use crate::ledger::Position;

/// A `/command` with its argument already interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Summary,
    Weekly,
    Monthly,
    Last,
    Remove,
    /// `None` when the argument is missing or not a number.
    Edit(Option<Position>),
    History,
    Reminder,
    Unknown(String),
}

impl Command {
    /// Parses text starting with `/`. Returns `None` for anything else.
    ///
    /// A trailing `@botname` on the command word is ignored, as group chats
    /// send `/summary@some_bot`.
    pub fn parse(text: &str) -> Option<Self> {
        let body = text.trim().strip_prefix('/')?;
        let (word, rest) = body
            .split_once(char::is_whitespace)
            .unwrap_or((body, ""));
        let name = word.split_once('@').map_or(word, |(name, _)| name);

        let command = match name.to_ascii_lowercase().as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "summary" => Command::Summary,
            "weekly" => Command::Weekly,
            "monthly" => Command::Monthly,
            "last" => Command::Last,
            "remove" => Command::Remove,
            "edit" => Command::Edit(rest.trim().parse().ok()),
            "history" => Command::History,
            "reminder" => Command::Reminder,
            _ => Command::Unknown(word.to_string()),
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(Command::parse("10rb, Makanan, Kantin"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn known_commands() {
        assert_eq!(Command::parse("/summary"), Some(Command::Summary));
        assert_eq!(Command::parse("  /weekly "), Some(Command::Weekly));
        assert_eq!(Command::parse("/history"), Some(Command::History));
        assert_eq!(Command::parse("/reminder"), Some(Command::Reminder));
    }

    #[test]
    fn bot_suffix_is_ignored() {
        assert_eq!(Command::parse("/summary@dompet_bot"), Some(Command::Summary));
        assert_eq!(Command::parse("/edit@dompet_bot 4"), Some(Command::Edit(Some(4))));
    }

    #[test]
    fn edit_argument() {
        assert_eq!(Command::parse("/edit 12"), Some(Command::Edit(Some(12))));
        assert_eq!(Command::parse("/edit   3 "), Some(Command::Edit(Some(3))));
        assert_eq!(Command::parse("/edit"), Some(Command::Edit(None)));
        assert_eq!(Command::parse("/edit abc"), Some(Command::Edit(None)));
        assert_eq!(Command::parse("/edit -1"), Some(Command::Edit(None)));
    }

    #[test]
    fn unknown_command_keeps_its_word() {
        assert_eq!(
            Command::parse("/delete 3"),
            Some(Command::Unknown("delete".to_string()))
        );
    }
}
