/// Line command parsing
pub mod command;

pub use command::{Command, CommandError};

use std::io::{self, Write};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::DisplayConfig;
use crate::ledger::{Amount, CategoryFilter, ExpenseLedger, LedgerError};
use crate::render;
use crate::transcription::{self, Transcriber, TranscriptionError};

const HELP: &str = "\
Commands:
  add <amount> <category> [description]   record an expense
  voice <wav-file>                        transcribe a WAV clip into the next description
                                          (WAV only; convert other recordings first)
  summary [category...]                   total and breakdown (no category = all)
  list [category...]                      numbered expense details (no category = all)
  clear                                   delete every expense in this session
  help                                    show this message
  quit                                    leave
Categories: Food, Transport, Shopping, Bills, Other";

/// Whether the input loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line
    Continue,
    /// Stop the session
    Quit,
}

/// One interactive session: owns its ledger and writes replies to `out`
///
/// Each session gets its own [`ExpenseLedger`]; nothing is shared between
/// sessions.
pub struct Session<W: Write> {
    ledger: ExpenseLedger,
    transcriber: Option<Arc<dyn Transcriber>>,
    pending_description: String,
    display: DisplayConfig,
    out: W,
}

impl<W: Write> Session<W> {
    /// Creates a session with an empty ledger
    pub fn new(display: DisplayConfig, transcriber: Option<Arc<dyn Transcriber>>, out: W) -> Self {
        Self {
            ledger: ExpenseLedger::new(),
            transcriber,
            pending_description: String::new(),
            display,
            out,
        }
    }

    /// Prints the banner and command list
    ///
    /// # Errors
    /// Returns error if writing to the output fails
    pub fn greet(&mut self) -> io::Result<()> {
        writeln!(self.out, "Personal Expense Tracker")?;
        if self.transcriber.is_some() {
            writeln!(self.out, "Voice input ready: 'voice <wav-file>' fills the next description.")?;
        }
        writeln!(self.out, "{HELP}")
    }

    /// Prints the input prompt
    ///
    /// # Errors
    /// Returns error if writing to the output fails
    pub fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "> ")?;
        self.out.flush()
    }

    /// Parses and runs one input line; parse errors are reported, not returned
    ///
    /// # Errors
    /// Returns error only if writing to the output fails
    pub fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        match self.parse_line(line)? {
            Some(command) => self.execute(command),
            None => Ok(Flow::Continue),
        }
    }

    /// Parses one input line, reporting malformed input to the user
    ///
    /// Returns `None` for blank or malformed lines.
    ///
    /// # Errors
    /// Returns error only if writing to the output fails
    pub fn parse_line(&mut self, line: &str) -> io::Result<Option<Command>> {
        match line.parse::<Command>() {
            Ok(command) => Ok(Some(command)),
            Err(CommandError::Empty) => Ok(None),
            Err(err) => {
                debug!(error = %err, "unparseable input");
                writeln!(self.out, "{err}")?;
                Ok(None)
            }
        }
    }

    /// Runs a parsed command
    ///
    /// `voice` transcribes synchronously on the calling thread.
    ///
    /// # Errors
    /// Returns error only if writing to the output fails
    pub fn execute(&mut self, command: Command) -> io::Result<Flow> {
        match command {
            Command::Add {
                amount,
                category,
                description,
            } => self.add(amount, &category, description)?,
            Command::Voice { path } => {
                if let Some(transcriber) = self.voice_transcriber()? {
                    let result = transcription::transcribe_clip(transcriber.as_ref(), &path);
                    self.apply_transcription(result)?;
                }
            }
            Command::Summary { categories } => self.summary(&categories)?,
            Command::List { categories } => self.list(&categories)?,
            Command::Clear => {
                let removed = self.ledger.clear();
                writeln!(self.out, "All expense records cleared! ({removed} removed)")?;
            }
            Command::Help => writeln!(self.out, "{HELP}")?,
            Command::Quit => {
                info!(records = self.ledger.len(), "session ended");
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    /// Stores the outcome of a transcription as the pending description
    ///
    /// Success replaces the pending description with the recognized text. Any
    /// failure clears it so the next `add` needs a typed description.
    ///
    /// # Errors
    /// Returns error only if writing to the output fails
    pub fn apply_transcription(
        &mut self,
        result: Result<String, TranscriptionError>,
    ) -> io::Result<()> {
        if let Err(err) = &result {
            writeln!(self.out, "Speech recognition failed: {err}")?;
        }
        self.pending_description = transcription::description_from(result);
        if !self.pending_description.is_empty() {
            writeln!(self.out, "Recognized: {}", self.pending_description)?;
        }
        Ok(())
    }

    /// Transcriber for a `voice` command, shared so it can run off the input thread
    ///
    /// Tells the user and returns `None` when voice input is off.
    ///
    /// # Errors
    /// Returns error only if writing to the output fails
    pub fn voice_transcriber(&mut self) -> io::Result<Option<Arc<dyn Transcriber>>> {
        if self.transcriber.is_none() {
            writeln!(
                self.out,
                "Voice input is unavailable; type the description instead."
            )?;
        }
        Ok(self.transcriber.clone())
    }

    /// Description waiting to pre-fill the next `add`
    #[must_use]
    pub fn pending_description(&self) -> &str {
        &self.pending_description
    }

    /// The session's ledger
    #[must_use]
    pub const fn ledger(&self) -> &ExpenseLedger {
        &self.ledger
    }

    /// Consumes the session, returning its output sink
    pub fn into_output(self) -> W {
        self.out
    }

    fn add(&mut self, amount: Amount, category: &str, description: Option<String>) -> io::Result<()> {
        let description = description.unwrap_or_else(|| self.pending_description.clone());
        match self.ledger.add(amount, category, description) {
            Ok(record) => {
                let line = render::render_record(record, &self.display);
                self.pending_description.clear();
                writeln!(self.out, "Expense added! {line}")
            }
            Err(err) => writeln!(self.out, "Rejected: {err}"),
        }
    }

    fn summary(&mut self, labels: &[String]) -> io::Result<()> {
        let filter = match CategoryFilter::from_labels(labels) {
            Ok(filter) => filter,
            Err(err) => return self.report(&err),
        };
        let summary = self.ledger.summarize(&filter);
        let text = render::render_summary(&summary, &self.display);
        writeln!(self.out, "{}", text.trim_end())
    }

    fn list(&mut self, labels: &[String]) -> io::Result<()> {
        let filter = match CategoryFilter::from_labels(labels) {
            Ok(filter) => filter,
            Err(err) => return self.report(&err),
        };
        let text = render::render_details(self.ledger.filtered(&filter), &self.display);
        writeln!(self.out, "{}", text.trim_end())
    }

    fn report(&mut self, err: &LedgerError) -> io::Result<()> {
        writeln!(self.out, "Rejected: {err}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::MockTranscriber;
    use rust_decimal::Decimal;

    fn session(transcriber: Option<Arc<dyn Transcriber>>) -> Session<Vec<u8>> {
        let display = DisplayConfig {
            currency_symbol: "$".to_owned(),
            bar_glyph: "#".to_owned(),
        };
        Session::new(display, transcriber, Vec::new())
    }

    fn output(session: Session<Vec<u8>>) -> String {
        String::from_utf8(session.into_output()).unwrap()
    }

    #[test]
    fn test_add_echoes_record() {
        let mut session = session(None);
        assert_eq!(session.handle_line("add 100 food lunch").unwrap(), Flow::Continue);
        assert_eq!(session.ledger().len(), 1);
        assert_eq!(output(session), "Expense added! $100.00 | Food | lunch\n");
    }

    #[test]
    fn test_rejected_add_leaves_ledger_untouched() {
        let mut session = session(None);
        session.handle_line("add 0 Food nothing").unwrap();
        session.handle_line("add 10 Travel trip").unwrap();
        assert!(session.ledger().is_empty());

        let text = output(session);
        assert!(text.contains("Rejected: amount must be greater than zero"));
        assert!(text.contains("Rejected: unknown category 'Travel'"));
    }

    #[test]
    fn test_parse_error_is_reported() {
        let mut session = session(None);
        assert_eq!(session.handle_line("fly away").unwrap(), Flow::Continue);
        assert_eq!(session.handle_line("").unwrap(), Flow::Continue);
        assert_eq!(output(session), "unknown command 'fly' (type 'help' for a list)\n");
    }

    #[test]
    fn test_voice_prefills_next_description() {
        let mut mock = MockTranscriber::new();
        mock.expect_transcribe().never();
        let mut session = session(Some(Arc::new(mock)));

        session
            .apply_transcription(Ok(" taxi to airport ".to_owned()))
            .unwrap();
        assert_eq!(session.pending_description(), "taxi to airport");

        session.handle_line("add 40 Transport").unwrap();
        assert_eq!(session.ledger().records()[0].description(), "taxi to airport");
        assert_eq!(session.pending_description(), "");

        session.handle_line("add 5 Food").unwrap();
        assert_eq!(session.ledger().records()[1].description(), "");
    }

    #[test]
    fn test_typed_description_wins_over_voice() {
        let mut session = session(None);
        session.apply_transcription(Ok("coffee".to_owned())).unwrap();

        session.handle_line("add 3 Food espresso").unwrap();

        assert_eq!(session.ledger().records()[0].description(), "espresso");
        assert_eq!(session.pending_description(), "");
    }

    #[test]
    fn test_pending_description_survives_rejected_add() {
        let mut session = session(None);
        session.apply_transcription(Ok("groceries".to_owned())).unwrap();

        session.handle_line("add -1 Food").unwrap();
        assert_eq!(session.pending_description(), "groceries");

        session.handle_line("add 20 Food").unwrap();
        assert_eq!(session.ledger().records()[0].description(), "groceries");
    }

    #[test]
    fn test_failed_transcription_clears_pending_description() {
        let mut session = session(None);
        session.apply_transcription(Ok("old text".to_owned())).unwrap();

        session
            .apply_transcription(Err(TranscriptionError::NoSpeech))
            .unwrap();

        assert_eq!(session.pending_description(), "");
        assert!(output(session).contains("Speech recognition failed: no speech detected"));
    }

    #[test]
    fn test_voice_command_with_unreadable_clip() {
        let mut mock = MockTranscriber::new();
        mock.expect_transcribe().never();
        let mut session = session(Some(Arc::new(mock)));

        session.handle_line("voice /nonexistent/clip.wav").unwrap();

        assert_eq!(session.pending_description(), "");
        assert!(output(session).contains("Speech recognition failed: unsupported audio clip"));
    }

    #[test]
    fn test_voice_without_transcriber() {
        let mut session = session(None);
        session.handle_line("voice clip.wav").unwrap();
        assert_eq!(
            output(session),
            "Voice input is unavailable; type the description instead.\n"
        );
    }

    #[test]
    fn test_summary_and_filtered_list() {
        let mut session = session(None);
        session.handle_line("add 100 Food lunch").unwrap();
        session.handle_line("add 50 Transport bus").unwrap();
        session.handle_line("add 25 Food snack").unwrap();
        let _ = std::mem::take(&mut session.out);

        session.handle_line("summary transport").unwrap();
        session.handle_line("list food").unwrap();

        assert_eq!(
            output(session),
            "Total Spent: $50.00\n\
             Expense Breakdown\n\
             Transport: $50.00 (100%)  ####################\n\
             1. $100.00 | Food | lunch\n\
             2. $25.00 | Food | snack\n"
        );
    }

    #[test]
    fn test_summary_with_unknown_filter() {
        let mut session = session(None);
        session.handle_line("summary groceries").unwrap();
        assert!(output(session).starts_with("Rejected: unknown category 'groceries'"));
    }

    #[test]
    fn test_clear_then_summary_is_empty() {
        let mut session = session(None);
        session.handle_line("add 9 Bills phone").unwrap();
        session.handle_line("clear").unwrap();
        session.handle_line("summary").unwrap();

        assert!(session.ledger().is_empty());
        let text = output(session);
        assert!(text.contains("All expense records cleared! (1 removed)"));
        assert!(text.ends_with("No expenses to show.\n"));
    }

    #[test]
    fn test_parse_line_reports_once() {
        let mut session = session(None);
        assert_eq!(session.parse_line("clear").unwrap(), Some(Command::Clear));
        assert_eq!(session.parse_line("   ").unwrap(), None);
        assert_eq!(session.parse_line("add ten Food").unwrap(), None);
        assert_eq!(output(session), "'ten' is not a valid amount\n");
    }

    #[test]
    fn test_voice_transcriber_shared_handle() {
        let mut mock = MockTranscriber::new();
        mock.expect_transcribe()
            .times(1)
            .returning(|_| Ok("parking".to_owned()));
        let mut session = session(Some(Arc::new(mock)));

        let transcriber = session.voice_transcriber().unwrap().unwrap();
        let result = transcriber.transcribe(&[0.0; 4]);
        session.apply_transcription(result).unwrap();

        assert_eq!(session.pending_description(), "parking");
        assert_eq!(output(session), "Recognized: parking\n");
    }

    #[test]
    fn test_help_says_voice_takes_wav_only() {
        let mut session = session(None);
        session.handle_line("help").unwrap();
        let text = output(session);
        assert!(text.contains("voice <wav-file>"));
        assert!(text.contains("WAV only"));
    }

    #[test]
    fn test_quit() {
        let mut session = session(None);
        assert_eq!(session.handle_line("exit").unwrap(), Flow::Quit);
    }

    #[test]
    fn test_summary_total_over_session() {
        let mut session = session(None);
        session.handle_line("add 1.25 Other a").unwrap();
        session.handle_line("add 2.75 Shopping b").unwrap();
        assert_eq!(
            session.ledger().summarize(&CategoryFilter::all()).total(),
            Decimal::from(4)
        );
    }
}
