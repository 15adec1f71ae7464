//! Interactive directory REPL
//!
//! Reads commands with reedline, drives the [`Directory`] controller and
//! prints whatever changed. Plain text is treated as a keyword search.
//!
//! Searches are debounced: the prompt returns at once and the result is
//! printed above it through reedline's external printer when it arrives.

use nu_ansi_term::{Color, Style};
use pb_app::{Directory, FormFields, Outcome};
use pb_client::{Category, ContactId, UnknownCategory};
use pb_core::PAGE_SIZES;
use reedline::{
    ColumnarMenu, Completer, DefaultHinter, Emacs, ExternalPrinter, KeyCode, KeyModifiers,
    Keybindings, MenuBuilder, Prompt, Reedline, ReedlineEvent, ReedlineMenu, Signal, Suggestion,
};
use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::command::{Command, COMMANDS};
use crate::render;

/// How long a list fetch may take before "Loading" is printed
const LOADING_DELAY: Duration = Duration::from_millis(150);

/// Input that clears an optional form field
const CLEAR_MARKER: &str = "-";

/// Command completer for reedline
#[derive(Clone)]
pub struct CommandCompleter {
    commands: Vec<(&'static str, &'static str)>,
}

impl CommandCompleter {
    pub fn new() -> Self {
        Self {
            commands: COMMANDS.to_vec(),
        }
    }
}

impl Default for CommandCompleter {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for CommandCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        if !line.starts_with('/') {
            return Vec::new();
        }

        self.commands
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(line))
            .map(|(cmd, desc)| Suggestion {
                value: cmd.to_string(),
                description: Some(desc.to_string()),
                span: reedline::Span::new(0, pos),
                append_whitespace: true,
                ..Suggestion::default()
            })
            .collect()
    }
}

/// Prompt with colored styling
struct ColoredPrompt {
    text: String,
    style: Style,
}

impl ColoredPrompt {
    fn new() -> Self {
        Self {
            text: "> ".to_string(),
            style: Color::Cyan.bold(),
        }
    }

    /// Prompt for one form field, showing its current value
    fn field(label: &str, current: &str) -> Self {
        let text = if current.is_empty() {
            format!("{}: ", label)
        } else {
            format!("{} [{}]: ", label, current)
        };
        Self {
            text,
            style: Color::Green.normal(),
        }
    }
}

impl Prompt for ColoredPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Owned(self.style.paint(&self.text).to_string())
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _prompt_mode: reedline::PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_history_search_indicator(
        &self,
        _history_search: reedline::PromptHistorySearch,
    ) -> Cow<'_, str> {
        Cow::Borrowed("")
    }
}

/// New value of a text field after the user typed `input`.
///
/// Empty input keeps the current value; `-` clears an optional field.
fn merge_field(current: &str, input: &str, optional: bool) -> String {
    let input = input.trim();
    if input.is_empty() {
        current.to_string()
    } else if optional && input == CLEAR_MARKER {
        String::new()
    } else {
        input.to_string()
    }
}

fn merge_category(
    current: Option<Category>,
    input: &str,
) -> Result<Option<Category>, UnknownCategory> {
    let input = input.trim();
    if input.is_empty() {
        Ok(current)
    } else if input == CLEAR_MARKER {
        Ok(None)
    } else {
        input.parse().map(Some)
    }
}

/// Text for the result of a list action: the list when it changed and
/// every notification raised since the last report
async fn outcome_report(directory: &Directory, outcome: Outcome, ignored: &str) -> String {
    let mut parts = Vec::new();
    match outcome {
        Outcome::Done => {
            if let Some(view) = directory.view().await {
                let query = directory.query().await;
                parts.push(render::list(&view, &query));
            }
        }
        Outcome::Ignored if !ignored.is_empty() => {
            parts.push(Style::new().dimmed().paint(ignored).to_string());
        }
        Outcome::Ignored | Outcome::Failed => {}
        Outcome::Stale => debug!("List action superseded"),
    }
    parts.extend(
        directory
            .take_notifications()
            .await
            .iter()
            .map(render::notification),
    );
    parts.join("\n")
}

struct Session {
    directory: Arc<Directory>,
    /// Plain editor for form fields and yes/no questions
    field_editor: Reedline,
    /// Output from background searches, shown above the main prompt
    printer: ExternalPrinter<String>,
}

impl Session {
    fn new(directory: Arc<Directory>, printer: ExternalPrinter<String>) -> Self {
        Self {
            directory,
            field_editor: Reedline::create(),
            printer,
        }
    }

    /// Print every notification not printed yet
    async fn print_notification(&mut self) {
        for note in self.directory.take_notifications().await {
            println!("{}", render::notification(&note));
        }
    }

    async fn print_list(&self) {
        if let Some(view) = self.directory.view().await {
            let query = self.directory.query().await;
            println!("{}", render::list(&view, &query));
        }
    }

    /// Await a list action, printing a loading line if it is slow
    async fn list_action<F>(&mut self, action: F, ignored: &str)
    where
        F: Future<Output = Outcome>,
    {
        tokio::pin!(action);
        let outcome = match tokio::time::timeout(LOADING_DELAY, &mut action).await {
            Ok(outcome) => outcome,
            Err(_) => {
                println!("{}", Style::new().dimmed().paint("Loading contacts..."));
                action.await
            }
        };

        let report = outcome_report(&self.directory, outcome, ignored).await;
        if !report.is_empty() {
            println!("{}", report);
        }
    }

    /// Schedule a debounced search and print its result when it lands.
    /// A search superseded by newer input prints nothing.
    fn search(&self, keyword: String) {
        let directory = Arc::clone(&self.directory);
        let pending = directory.search_debounced(keyword);
        let printer = self.printer.clone();

        tokio::spawn(async move {
            let Ok(outcome) = pending.await else {
                debug!("Search superseded before it was sent");
                return;
            };
            let report = outcome_report(&directory, outcome, "").await;
            if !report.is_empty() && printer.print(report).is_err() {
                debug!("Prompt closed, search result dropped");
            }
        });
    }

    /// Ask a question on the field editor; `None` when cancelled
    fn ask(&mut self, label: &str, current: &str) -> anyhow::Result<Option<String>> {
        let prompt = ColoredPrompt::field(label, current);
        match self.field_editor.read_line(&prompt)? {
            Signal::Success(line) => Ok(Some(line)),
            _ => Ok(None),
        }
    }

    fn confirm(&mut self, question: &str) -> anyhow::Result<bool> {
        let answer = self.ask(&format!("{} [y/N]", question), "")?;
        Ok(matches!(
            answer.as_deref().map(str::trim),
            Some("y") | Some("Y") | Some("yes")
        ))
    }

    /// Walk through every field; `None` when the user cancels
    fn prompt_fields(&mut self, current: &FormFields) -> anyhow::Result<Option<FormFields>> {
        let mut fields = current.clone();

        let text_fields: [(&str, bool); 5] = [
            ("Name", false),
            ("Phone number", false),
            ("Email", true),
            ("Address", true),
            ("Notes", true),
        ];
        for (label, optional) in text_fields {
            let slot = match label {
                "Name" => &mut fields.name,
                "Phone number" => &mut fields.phone_number,
                "Email" => &mut fields.email,
                "Address" => &mut fields.address,
                _ => &mut fields.notes,
            };
            let current = slot.clone();
            let Some(input) = self.ask(label, &current)? else {
                return Ok(None);
            };
            *slot = merge_field(&current, &input, optional);
        }

        loop {
            let shown = fields.category_key().unwrap_or("").to_string();
            let Some(input) = self.ask("Category (personal/business/family/friend/other)", &shown)?
            else {
                return Ok(None);
            };
            match merge_category(fields.category, &input) {
                Ok(category) => {
                    // Any answer but Enter replaces a category kept from the server
                    if !input.trim().is_empty() {
                        fields.kept_category = None;
                    }
                    fields.category = category;
                    break;
                }
                Err(e) => eprintln!("{}", Color::Red.paint(e.to_string())),
            }
        }

        Ok(Some(fields))
    }

    /// Fill in and submit the open form, re-prompting after a failed save
    async fn form_flow(&mut self) -> anyhow::Result<()> {
        let directory = Arc::clone(&self.directory);

        loop {
            let form = directory.form().await;
            println!();
            println!("{}", render::form(&form));
            println!(
                "{}",
                Style::new()
                    .dimmed()
                    .paint("Enter keeps a value, '-' clears an optional field, Ctrl-C cancels")
            );

            let Some(fields) = self.prompt_fields(form.fields())? else {
                directory.close_form().await;
                println!("{}", Style::new().dimmed().paint("Cancelled"));
                return Ok(());
            };
            directory.edit_form(|f| *f = fields).await;

            if directory.check_duplicates().await.is_some() {
                self.print_notification().await;
            }

            match directory.save().await {
                Outcome::Done => {
                    self.print_list().await;
                    self.print_notification().await;
                    return Ok(());
                }
                Outcome::Failed => {
                    self.print_notification().await;
                    if !self.confirm("Edit again?")? {
                        directory.close_form().await;
                        return Ok(());
                    }
                }
                Outcome::Ignored | Outcome::Stale => return Ok(()),
            }
        }
    }

    async fn delete_many(&mut self, ids: Vec<ContactId>) -> anyhow::Result<()> {
        let list = ids
            .iter()
            .map(|id| format!("#{}", id))
            .collect::<Vec<_>>()
            .join(", ");
        if !self.confirm(&format!("Delete {} contacts ({})?", ids.len(), list))? {
            println!("{}", Style::new().dimmed().paint("Cancelled"));
            return Ok(());
        }

        let directory = Arc::clone(&self.directory);
        self.list_action(directory.delete_many(&ids), "Nothing to delete")
            .await;
        Ok(())
    }

    async fn run(&mut self, command: Command) -> anyhow::Result<()> {
        let directory = Arc::clone(&self.directory);
        debug!("Running {:?}", command);

        match command {
            Command::List => {
                self.list_action(directory.refresh(), "").await;
            }
            Command::Next => {
                self.list_action(directory.next_page(), "Already on the last page")
                    .await;
            }
            Command::Prev => {
                self.list_action(directory.previous_page(), "Already on the first page")
                    .await;
            }
            Command::Page(page) => {
                self.list_action(directory.change_page(page), "No such page, or already there")
                    .await;
            }
            Command::Size(size) => {
                if !PAGE_SIZES.contains(&size) {
                    eprintln!(
                        "{}",
                        Color::Red.paint(format!("Page size must be one of {:?}", PAGE_SIZES))
                    );
                    return Ok(());
                }
                self.list_action(directory.set_page_size(size), "").await;
            }
            Command::Search(keyword) => self.search(keyword),
            Command::Category(category) => {
                self.list_action(directory.filter_category(category), "")
                    .await;
            }
            Command::Clear => {
                self.list_action(directory.clear_filters(), "").await;
            }
            Command::Add => {
                directory.open_create().await;
                self.form_flow().await?;
            }
            Command::Edit(id) => {
                if directory.open_edit(id).await == Outcome::Done {
                    self.form_flow().await?;
                } else {
                    self.print_notification().await;
                }
            }
            Command::Delete(id) => {
                directory.request_delete(id).await;
                println!(
                    "{} Type /confirm to delete or /cancel to keep it.",
                    Color::Yellow.paint(format!("Delete contact #{}?", id))
                );
            }
            Command::Confirm => {
                if directory.pending_delete().await.is_none() {
                    println!("{}", Style::new().dimmed().paint("No delete pending"));
                    return Ok(());
                }
                self.list_action(directory.confirm_delete(), "Delete already in progress")
                    .await;
            }
            Command::Cancel => {
                directory.cancel_delete().await;
                println!("{}", Style::new().dimmed().paint("Delete cancelled"));
            }
            Command::Stats => {
                if directory.show_statistics().await == Outcome::Done {
                    if let Some(view) = directory.statistics().await {
                        println!("{}", render::statistics(&view));
                    }
                    directory.close_statistics().await;
                }
                self.print_notification().await;
            }
            Command::Phone(number) => {
                if let Some(card) = directory.find_by_phone(&number).await {
                    println!();
                    println!("{}", render::card(&card));
                }
                self.print_notification().await;
            }
            Command::DeleteMany(ids) => self.delete_many(ids).await?,
            Command::Help => print_help(),
            Command::Quit => {}
        }
        Ok(())
    }
}

/// Run the interactive directory
pub async fn run_cli(directory: Arc<Directory>) -> anyhow::Result<()> {
    info!("Starting interactive directory");

    print_welcome();

    let mut keybindings = default_keybindings();

    // Trigger completion on '/' key
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Char('/'),
        ReedlineEvent::Edit(vec![reedline::EditCommand::Complete]),
    );

    let menu = Box::new(
        ColumnarMenu::default()
            .with_name("command_menu")
            .with_columns(1)
            .with_column_width(Some(40))
            .with_only_buffer_difference(false),
    );

    let hinter = DefaultHinter::default().with_style(Style::new().dimmed());

    let printer = ExternalPrinter::<String>::default();

    let mut line_editor = Reedline::create()
        .with_completer(Box::new(CommandCompleter::new()))
        .with_menu(ReedlineMenu::EngineCompleter(menu))
        .with_hinter(Box::new(hinter))
        .with_edit_mode(Box::new(Emacs::new(keybindings)))
        .with_external_printer(printer.clone());

    let prompt = ColoredPrompt::new();
    let mut session = Session::new(directory, printer);

    session.run(Command::List).await?;

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }

                match Command::parse(input) {
                    Ok(Command::Quit) => {
                        println!("\nGoodbye!\n");
                        break;
                    }
                    Ok(command) => {
                        if let Err(e) = session.run(command).await {
                            eprintln!("\n{}\n", Color::Red.paint(format!("Error: {}", e)));
                        }
                    }
                    Err(e) => eprintln!("{}", Color::Red.paint(e.to_string())),
                }
            }
            Ok(Signal::CtrlC) => {
                println!("^C");
                continue;
            }
            Ok(Signal::CtrlD) => {
                println!("\nGoodbye!\n");
                break;
            }
            Err(err) => {
                eprintln!("\n{}\n", Color::Red.paint(format!("Error: {}", err)));
                break;
            }
        }
    }

    Ok(())
}

/// Default keybindings for reedline
fn default_keybindings() -> Keybindings {
    let mut keybindings = Keybindings::new();
    // Tab key triggers completion
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::Edit(vec![reedline::EditCommand::Complete]),
    );
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Enter, ReedlineEvent::Submit);
    // Esc key clears/closes menus
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Esc, ReedlineEvent::Esc);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('c'), ReedlineEvent::CtrlC);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('d'), ReedlineEvent::CtrlD);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Up, ReedlineEvent::Up);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Down, ReedlineEvent::Down);
    keybindings
}

/// Print welcome message
fn print_welcome() {
    println!();
    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║                   📇 phonebook directory                   ║");
    println!("╠════════════════════════════════════════════════════════════╣");
    println!("║  Type text and Enter to search, or a command               ║");
    println!("║  Commands: /add, /edit ID, /delete ID, /stats, /help       ║");
    println!("║  Type / to see command suggestions                         ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    println!();
}

/// Print help message
fn print_help() {
    println!();
    println!("📖 Commands:");
    for (cmd, desc) in COMMANDS {
        println!("  {:<14} {}", cmd, desc);
    }
    println!();
    println!("💡 Text without a leading / searches names, phone numbers and emails");
    println!("💡 Use arrow keys (↑/↓) to pick a suggestion and Enter to accept");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_app::DirectorySettings;
    use pb_client::ContactsClient;
    use pb_core::ApiConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn directory_for(server: &MockServer, notification_duration: Duration) -> Arc<Directory> {
        let config = ApiConfig {
            base_url: format!("{}/api/contacts", server.uri()),
            timeout_secs: 5,
        };
        let client = ContactsClient::new(&config).unwrap();
        Arc::new(Directory::new(
            Arc::new(client),
            DirectorySettings {
                page_size: 10,
                search_debounce: Duration::from_millis(20),
                notification_duration,
            },
        ))
    }

    #[tokio::test]
    async fn test_typed_burst_sends_one_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/contacts/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "contacts": [{"id": 1, "name": "Alice", "phoneNumber": "555-1212"}],
                "currentPage": 0,
                "totalItems": 1,
                "totalPages": 1
            })))
            .expect(1)
            .mount(&server)
            .await;
        let directory = directory_for(&server, Duration::from_secs(3));

        let mut pending: Vec<_> = ["a", "al", "ali"]
            .into_iter()
            .map(|keyword| directory.search_debounced(keyword))
            .collect();
        let outcome = pending.pop().unwrap().await.unwrap();
        for superseded in pending {
            assert!(superseded.await.is_err());
        }

        let report = outcome_report(&directory, outcome, "").await;
        assert!(report.contains("Alice"));
        assert!(report.contains("search \"ali\""));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.query().unwrap_or("").contains("keyword=ali"));
    }

    #[tokio::test]
    async fn test_report_includes_expired_notification() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/contacts"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"message": "Database unavailable"})),
            )
            .mount(&server)
            .await;
        let directory = directory_for(&server, Duration::from_millis(10));

        let outcome = directory.refresh().await;
        assert_eq!(outcome, Outcome::Failed);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(directory.notification().await.is_none());

        let report = outcome_report(&directory, outcome, "").await;
        assert!(report.contains("Database unavailable"));
        // Delivered once
        assert!(outcome_report(&directory, outcome, "").await.is_empty());

        let report = outcome_report(&directory, Outcome::Ignored, "Already on the last page").await;
        assert!(report.contains("Already on the last page"));
    }

    #[test]
    fn test_merge_field() {
        assert_eq!(merge_field("Alice", "", false), "Alice");
        assert_eq!(merge_field("Alice", "  Alicia ", false), "Alicia");
        assert_eq!(merge_field("a@b.c", "-", true), "");
        // Required fields take '-' literally
        assert_eq!(merge_field("555", "-", false), "-");
    }

    #[test]
    fn test_merge_category() {
        assert_eq!(
            merge_category(Some(Category::Family), ""),
            Ok(Some(Category::Family))
        );
        assert_eq!(merge_category(Some(Category::Family), "-"), Ok(None));
        assert_eq!(
            merge_category(None, "Business"),
            Ok(Some(Category::Business))
        );
        assert!(merge_category(None, "coworker").is_err());
    }

    #[test]
    fn test_completer_filters_commands() {
        let mut completer = CommandCompleter::new();

        let suggestions = completer.complete("/del", 4);
        let values: Vec<_> = suggestions.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["/delete", "/delete-many"]);

        assert!(completer.complete("alice", 5).is_empty());
        assert_eq!(completer.complete("/", 1).len(), COMMANDS.len());
    }
}
