use std::env;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent},
    terminal,
};
use tracing::{debug, warn};

use crate::error::ProviderError;

const KEY_PROMPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for clients whose credential lives in an environment variable.
pub trait KeyFromEnv {
    /// The environment variable name for this client's API key
    const KEY_NAME: &'static str;

    /// Look in the process environment, loading `.env` first if present.
    fn find_key() -> Option<String> {
        let _ = dotenvy::dotenv();
        env::var(Self::KEY_NAME).ok().filter(|k| !k.trim().is_empty())
    }

    fn require_key() -> Result<String, ProviderError> {
        Self::find_key().ok_or(ProviderError::MissingKey(Self::KEY_NAME))
    }

    /// Like `require_key`, but asks on the terminal when the key is missing
    /// and offers to append it to `.env`.
    fn find_key_with_user() -> Result<String, ProviderError> {
        if let Some(key) = Self::find_key() {
            return Ok(key);
        }

        print!(
            "Environment variable {} not found. Please enter the API key ({}s timeout): ",
            Self::KEY_NAME,
            KEY_PROMPT_TIMEOUT.as_secs()
        );
        let _ = io::stdout().flush();

        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let mut input = String::new();
            if io::stdin().read_line(&mut input).is_ok() {
                let _ = sender.send(input.trim().to_string());
            }
        });

        let api_key = match receiver.recv_timeout(KEY_PROMPT_TIMEOUT) {
            Ok(input) if !input.is_empty() => input,
            _ => return Err(ProviderError::MissingKey(Self::KEY_NAME)),
        };

        if Self::prompt_save_to_env() {
            match Self::save_to_env_file(&api_key) {
                Ok(()) => println!("API key saved to .env file"),
                Err(e) => warn!(error = %e, key = Self::KEY_NAME, "Failed to save key to .env"),
            }
        }

        Ok(api_key)
    }

    fn prompt_save_to_env() -> bool {
        print!("Add {} to .env file? (y/N): ", Self::KEY_NAME);
        let _ = io::stdout().flush();

        match read_yes_no_key() {
            Ok(answer) => {
                println!("{}", if answer { "y" } else { "n" });
                answer
            }
            Err(e) => {
                debug!(error = %e, "Raw keystroke unavailable, falling back to line input");
                let mut input = String::new();
                io::stdin().read_line(&mut input).is_ok() && input.trim().eq_ignore_ascii_case("y")
            }
        }
    }

    fn save_to_env_file(api_key: &str) -> io::Result<()> {
        if let Ok(content) = std::fs::read_to_string(".env") {
            if content.contains(&format!("{}=", Self::KEY_NAME)) {
                return Ok(());
            }
        }

        let mut file = OpenOptions::new().create(true).append(true).open(".env")?;
        writeln!(file, "{}={}", Self::KEY_NAME, api_key)
    }
}

/// Single keystroke y/n. Anything but `y` is a no, as is a timeout.
fn read_yes_no_key() -> io::Result<bool> {
    terminal::enable_raw_mode()?;

    let result = match event::poll(KEY_PROMPT_TIMEOUT) {
        Ok(true) => match event::read() {
            Ok(Event::Key(KeyEvent { code: KeyCode::Char('y' | 'Y'), .. })) => Ok(true),
            Ok(_) => Ok(false),
            Err(e) => Err(e),
        },
        Ok(false) => Ok(false),
        Err(e) => Err(e),
    };

    terminal::disable_raw_mode()?;
    result
}

/// Knobs for quiz requests and the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSettings {
    pub min_questions: usize,
    pub max_questions: usize,
    pub default_count: usize,
    /// Block submission until every question has an answer.
    pub require_all_answered: bool,
    /// Reset keeps the topic field instead of clearing it.
    pub keep_topic_on_reset: bool,
    pub request_timeout_secs: u64,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            min_questions: 1,
            max_questions: 20,
            default_count: 5,
            require_all_answered: false,
            keep_topic_on_reset: false,
            request_timeout_secs: 60,
        }
    }
}

impl QuizSettings {
    /// Defaults overridden by `QUIZ_*` variables. Unparseable values are
    /// logged and ignored.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let mut settings = Self::default();
        override_from_env("QUIZ_MIN_QUESTIONS", &mut settings.min_questions);
        override_from_env("QUIZ_MAX_QUESTIONS", &mut settings.max_questions);
        override_from_env("QUIZ_DEFAULT_COUNT", &mut settings.default_count);
        override_from_env("QUIZ_REQUIRE_ALL_ANSWERED", &mut settings.require_all_answered);
        override_from_env("QUIZ_KEEP_TOPIC_ON_RESET", &mut settings.keep_topic_on_reset);
        override_from_env("QUIZ_REQUEST_TIMEOUT_SECS", &mut settings.request_timeout_secs);
        settings.normalized()
    }

    /// Keep the bounds ordered and the default count inside them.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.min_questions = self.min_questions.max(1);
        self.max_questions = self.max_questions.max(self.min_questions);
        self.default_count = self.default_count.clamp(self.min_questions, self.max_questions);
        self
    }

    #[must_use]
    pub const fn with_require_all_answered(mut self, value: bool) -> Self {
        self.require_all_answered = value;
        self
    }

    #[must_use]
    pub const fn with_keep_topic_on_reset(mut self, value: bool) -> Self {
        self.keep_topic_on_reset = value;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn override_from_env<T: FromStr>(name: &str, slot: &mut T) {
    if let Ok(raw) = env::var(name) {
        match raw.trim().parse() {
            Ok(value) => *slot = value,
            Err(_) => warn!(variable = name, value = %raw, "Ignoring unparseable setting"),
        }
    }
}
