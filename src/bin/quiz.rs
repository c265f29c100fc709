use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use quiz_forge::clients::{ClientType, FlexibleClient};
use quiz_forge::interceptors::FileInterceptor;
use quiz_forge::quiz::{OptionMark, QuestionKind, ReviewItem};
use quiz_forge::{Action, Answer, Difficulty, Phase, QuestionMix, QuizGenerator, QuizSettings, Session, SessionError};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "AI-generated quizzes in your terminal", long_about = None)]
#[command(after_help = "ENVIRONMENT VARIABLES:
    GEMINI_API_KEY              API key for the Gemini client
    ANTHROPIC_API_KEY           API key for the Claude client
    DEEPSEEK_API_KEY            API key for the DeepSeek client
    QUIZ_MAX_QUESTIONS          Upper bound for --count [default: 20]
    QUIZ_REQUIRE_ALL_ANSWERED   Block submission until every question is answered
    QUIZ_KEEP_TOPIC_ON_RESET    Remember the topic when starting over
    RUST_LOG                    Log filter, e.g. quiz_forge=debug

EXAMPLES:
    quiz                                  # Auto-detect client, ask for everything
    quiz --topic \"Roman Empire\" -d hard   # Skip straight to the first quiz
    quiz --client mock                    # Offline demo quiz
    quiz --mixed --transcript-dir logs    # Mixed question types, save transcripts")]
struct Args {
    /// Client: gemini, claude, deepseek, mock [default: auto-detect]
    #[arg(short, long)]
    client: Option<ClientType>,

    /// Topic for the first quiz
    #[arg(short, long)]
    topic: Option<String>,

    /// Difficulty: easy, medium, hard
    #[arg(short, long)]
    difficulty: Option<Difficulty>,

    /// Number of questions
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Mix multiple choice, short answer and fill-in-the-blank questions
    #[arg(long)]
    mixed: bool,

    /// Require every question to be answered before submitting
    #[arg(long)]
    require_all: bool,

    /// Save each prompt and raw response under this directory
    #[arg(long)]
    transcript_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Line-based terminal input. `None` means end of input.
struct Terminal {
    input: io::StdinLock<'static>,
}

impl Terminal {
    fn new() -> Self {
        Self { input: io::stdin().lock() }
    }

    fn ask(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        print!("{}", prompt);
        io::stdout().flush().context("flushing stdout")?;
        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("reading stdin")?;
        Ok((read > 0).then(|| line.trim().to_string()))
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "quiz_forge=debug,quiz=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut settings = QuizSettings::from_env();
    if args.require_all {
        settings = settings.with_require_all_answered(true);
    }

    let client_type = args.client.unwrap_or_default();
    let client = FlexibleClient::from_type(client_type, settings.request_timeout())
        .with_context(|| format!("creating {} client", client_type))?;
    println!("Using {} client", client.client_type());

    let mut generator = QuizGenerator::new(client, settings.clone());
    if let Some(dir) = &args.transcript_dir {
        generator = generator.with_interceptor(Arc::new(FileInterceptor::new(dir.clone())));
    }

    let presets = form_presets(&args);
    let mut session = Session::new(settings);
    apply_presets(&mut session, &presets)?;

    let mut terminal = Terminal::new();
    let mut preset_topic = args.topic;

    loop {
        let keep_going = match session.phase() {
            Phase::FormEntry => form_entry(&mut session, &generator, &mut terminal, preset_topic.take()).await?,
            Phase::QuizTaking { review: false } => take_quiz(&mut session, &mut terminal, &presets)?,
            Phase::QuizTaking { review: true } => {
                show_review(&session);
                session.dispatch(Action::FinishReview)?;
                true
            }
            Phase::Result => result_menu(&mut session, &mut terminal, &presets)?,
        };
        if !keep_going {
            break;
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Form choices given on the command line. They are re-applied after every
/// reset, since a reset returns the form to its defaults.
fn form_presets(args: &Args) -> Vec<Action> {
    let mut presets = Vec::new();
    if let Some(difficulty) = args.difficulty {
        presets.push(Action::SetDifficulty(difficulty));
    }
    if let Some(count) = args.count {
        presets.push(Action::SetCount(count));
    }
    if args.mixed {
        presets.push(Action::SetMix(QuestionMix::Mixed));
    }
    presets
}

fn apply_presets(session: &mut Session, presets: &[Action]) -> Result<(), SessionError> {
    presets.iter().try_for_each(|action| session.dispatch(action.clone()))
}

fn start_over(session: &mut Session, presets: &[Action]) -> Result<(), SessionError> {
    session.dispatch(Action::Reset)?;
    apply_presets(session, presets)
}

async fn form_entry(
    session: &mut Session,
    generator: &QuizGenerator<FlexibleClient>,
    terminal: &mut Terminal,
    preset_topic: Option<String>,
) -> anyhow::Result<bool> {
    if let Some(error) = session.error() {
        println!("\n! {}", error);
    }

    let topic = match preset_topic {
        Some(topic) => topic,
        None => {
            let current = session.topic().to_string();
            let prompt = if current.is_empty() {
                "\nQuiz topic (blank to quit): ".to_string()
            } else {
                format!("\nQuiz topic [{}] (q to quit): ", current)
            };
            match terminal.ask(&prompt)? {
                None => return Ok(false),
                Some(t) if t.eq_ignore_ascii_case("q") => return Ok(false),
                Some(t) if t.is_empty() && current.is_empty() => return Ok(false),
                Some(t) if t.is_empty() => current,
                Some(t) => t,
            }
        }
    };
    session.dispatch(Action::SetTopic(topic))?;

    let prompt = format!("Difficulty (easy/medium/hard) [{}]: ", session.difficulty());
    if let Some(answer) = terminal.ask(&prompt)?.filter(|a| !a.is_empty()) {
        match answer.parse::<Difficulty>() {
            Ok(difficulty) => session.dispatch(Action::SetDifficulty(difficulty))?,
            Err(e) => println!("{} - keeping {}", e, session.difficulty()),
        }
    }

    let settings = session.settings();
    let prompt = format!(
        "Number of questions ({}-{}) [{}]: ",
        settings.min_questions,
        settings.max_questions,
        session.count()
    );
    if let Some(answer) = terminal.ask(&prompt)?.filter(|a| !a.is_empty()) {
        match answer.parse::<usize>() {
            Ok(count) => session.dispatch(Action::SetCount(count))?,
            Err(_) => println!("'{}' is not a number - keeping {}", answer, session.count()),
        }
    }

    println!("Generating your quiz...");
    session.generate(generator).await?;
    Ok(true)
}

fn print_question(number: usize, total: usize, kind: &QuestionKind, prompt: &str) {
    println!("\nQuestion {} of {} ({})", number, total, kind.label());
    println!("{}", prompt);
    if let Some(options) = kind.options() {
        for (i, option) in options.iter().enumerate() {
            println!("  {}. {}", i + 1, option);
        }
    }
}

fn parse_answer(kind: &QuestionKind, input: &str) -> Option<Answer> {
    if input.is_empty() {
        return None;
    }
    match kind.options() {
        Some(options) => input
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=options.len()).contains(n))
            .map(|n| Answer::Choice(n - 1)),
        None => Some(Answer::Text(input.to_string())),
    }
}

fn take_quiz(session: &mut Session, terminal: &mut Terminal, presets: &[Action]) -> anyhow::Result<bool> {
    let Some(quiz) = session.quiz().cloned() else {
        start_over(session, presets)?;
        return Ok(true);
    };
    let total = quiz.len();
    println!("\n== {} ({}) ==", quiz.request().trimmed_topic(), quiz.request().difficulty);
    println!("Press Enter to skip a question.");

    for (i, question) in quiz.questions().iter().enumerate() {
        if session.answers()[i].is_answered() {
            continue;
        }
        print_question(i + 1, total, &question.kind, &question.prompt);
        let hint = if question.kind.options().is_some() { "Your choice (1-4): " } else { "Your answer: " };
        loop {
            let Some(input) = terminal.ask(hint)? else {
                return Ok(false);
            };
            if input.is_empty() {
                break;
            }
            match parse_answer(&question.kind, &input) {
                Some(answer) => {
                    session.dispatch(Action::RecordAnswer { index: i, answer })?;
                    break;
                }
                None => println!("Please enter a number between 1 and 4."),
            }
        }
    }

    match session.dispatch(Action::Submit) {
        Ok(()) => Ok(true),
        Err(e @ SessionError::Incomplete { .. }) => {
            println!("\n! {}", e);
            Ok(true)
        }
        Err(e) => Err(e.into()),
    }
}

fn result_menu(session: &mut Session, terminal: &mut Terminal, presets: &[Action]) -> anyhow::Result<bool> {
    if let Some(score) = session.score() {
        println!("\nYou scored {} / {} ({}%)", score.correct, score.total, score.percentage());
        if score.is_perfect() {
            println!("Perfect score!");
        }
    }

    loop {
        match terminal.ask("[r]eview answers, [n]ew quiz, [q]uit: ")?.as_deref() {
            None | Some("q") => return Ok(false),
            Some("r") => {
                session.dispatch(Action::Review)?;
                return Ok(true);
            }
            Some("n") => {
                start_over(session, presets)?;
                return Ok(true);
            }
            Some(_) => continue,
        }
    }
}

fn print_review_item(item: &ReviewItem<'_>) {
    let verdict = if item.is_correct { "correct" } else { "incorrect" };
    println!("\n{}. {} [{}]", item.number, item.question.prompt, verdict);

    if item.options.is_empty() {
        println!("   Your answer:    {}", item.given_display.as_deref().unwrap_or("(no answer)"));
        println!("   Correct answer: {}", item.correct_display);
    } else {
        for option in &item.options {
            let marker = match (option.mark, option.selected) {
                (OptionMark::Correct, true) => "[x] ok",
                (OptionMark::Correct, false) => "[ ] ok",
                (OptionMark::SelectedWrong, _) => "[x]   ",
                (OptionMark::Neutral, _) => "[ ]   ",
            };
            println!("   {} {}", marker, option.text);
        }
        if item.given_display.is_none() {
            println!("   (no answer)");
        }
    }

    if let Some(explanation) = &item.question.explanation {
        println!("   {}", explanation);
    }
}

fn show_review(session: &Session) {
    println!("\n== Review ==");
    for item in session.review_items().unwrap_or_default() {
        print_review_item(&item);
    }
}
