use std::path::Path;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::db::{KeyValueStore, LocalState, SqliteStore};
use crate::error::{AppError, Result};
use crate::listing::filter_and_sort;
use crate::models::{
    CategoryFilter, DemographicsForm, Field, NewPost, Post, PostId, SeedPost, SortMode,
};
use crate::services::share;
use crate::services::{PostRepository, SupabaseClient};
use crate::tui::{AppAction, InputMode};
use crate::workflow::{ComposeSession, VoteOutcome, VoteSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    List,
    Detail,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemographicsRow {
    Gender,
    AgeGroup,
}

pub struct App<S = SqliteStore, R = SupabaseClient> {
    // Data
    pub posts: Vec<Post>,

    // UI State
    pub screen: Screen,
    pub selected_index: usize,
    pub category: CategoryFilter,
    pub sort: SortMode,
    pub query: String,
    pub search_active: bool,
    pub show_help: bool,
    pub status: Option<String>,

    // Workflows
    pub vote: Option<VoteSession>,
    pub demographics: Option<DemographicsForm>,
    pub demographics_row: DemographicsRow,
    pub compose: Option<ComposeSession>,
    pub compose_field: Field,

    // Services
    local: LocalState<S>,
    repository: Option<R>,
    share_base_url: String,
    autosave_delay: Duration,
}

impl App {
    pub async fn new(config: &Config) -> Result<Self> {
        let local = LocalState::new(SqliteStore::open(&config.storage_path)?);

        let repository = match (&config.supabase_url, &config.supabase_anon_key) {
            (Some(url), Some(key)) => Some(SupabaseClient::new(
                url,
                key.clone(),
                config.posts_table.clone(),
                config.request_timeout(),
            )?),
            _ => {
                tracing::warn!("Backend not configured, remote operations are disabled");
                None
            }
        };

        let mut app = Self::with_services(
            local,
            repository,
            config.share_base_url.clone(),
            config.autosave_delay(),
        );

        if app.repository.is_some() {
            if let Err(e) = app.load_posts().await {
                app.report(e);
            }
        } else {
            app.status = Some(not_configured_message());
        }

        Ok(app)
    }
}

impl<S: KeyValueStore, R: PostRepository> App<S, R> {
    pub fn with_services(
        local: LocalState<S>,
        repository: Option<R>,
        share_base_url: String,
        autosave_delay: Duration,
    ) -> Self {
        Self {
            posts: Vec::new(),
            screen: Screen::List,
            selected_index: 0,
            category: CategoryFilter::All,
            sort: SortMode::Latest,
            query: String::new(),
            search_active: false,
            show_help: false,
            status: None,
            vote: None,
            demographics: None,
            demographics_row: DemographicsRow::Gender,
            compose: None,
            compose_field: Field::Title,
            local,
            repository,
            share_base_url,
            autosave_delay,
        }
    }

    pub fn filtered_posts(&self) -> Vec<&Post> {
        filter_and_sort(&self.posts, self.category, &self.query, self.sort)
    }

    pub fn selected_post(&self) -> Option<&Post> {
        let posts = self.filtered_posts();
        posts.get(self.selected_index).copied()
    }

    pub fn input_mode(&self) -> InputMode {
        if self.show_help {
            return InputMode::Help;
        }

        match self.screen {
            Screen::List if self.search_active => InputMode::Search,
            Screen::List => InputMode::List,
            Screen::Detail if self.demographics.is_some() => InputMode::Demographics,
            Screen::Detail => InputMode::Detail,
            Screen::Write
                if self
                    .compose
                    .as_ref()
                    .is_some_and(|c| c.found_draft().is_some()) =>
            {
                InputMode::DraftPrompt
            }
            Screen::Write => InputMode::Write,
        }
    }

    /// Returns true when the app should quit.
    pub async fn handle_action(&mut self, action: AppAction) -> bool {
        if action == AppAction::Quit {
            return true;
        }

        self.status = None;
        if let Err(e) = self.dispatch(action).await {
            self.report(e);
        }
        false
    }

    async fn dispatch(&mut self, action: AppAction) -> Result<()> {
        match action {
            AppAction::Quit => {}

            AppAction::MoveUp => {
                if self.selected_index > 0 {
                    self.selected_index -= 1;
                }
            }

            AppAction::MoveDown => {
                let len = self.filtered_posts().len();
                if len > 0 && self.selected_index < len - 1 {
                    self.selected_index += 1;
                }
            }

            AppAction::OpenPost => {
                if let Some(post) = self.selected_post() {
                    let id = post.id.clone();
                    self.open_post(&id).await?;
                }
            }

            AppAction::Back => {
                self.leave_to_list();
                self.load_posts().await?;
            }

            AppAction::Refresh => {
                self.load_posts().await?;
            }

            AppAction::CycleCategory => {
                self.category = self.category.cycle();
                self.selected_index = 0;
            }

            AppAction::ToggleSort => {
                self.sort = self.sort.toggle();
                self.selected_index = 0;
            }

            AppAction::NewPost => {
                self.vote = None;
                self.demographics = None;
                self.compose = Some(ComposeSession::enter(&self.local, self.autosave_delay));
                self.compose_field = Field::Title;
                self.screen = Screen::Write;
            }

            AppAction::Vote(side) => {
                if let Some(session) = self.vote.as_mut() {
                    if session.has_voted() {
                        return Err(AppError::AlreadyVoted);
                    }
                    let repo = remote(&self.repository)?;
                    let outcome = session.cast_vote(side, &self.local, repo).await?;
                    self.apply_vote_outcome(outcome);
                }
            }

            AppAction::Share(target) => {
                if let Some(session) = &self.vote {
                    let message = share::share(target, session.post(), &self.share_base_url);
                    self.status = Some(message);
                }
            }

            AppAction::ShowHelp => {
                self.show_help = true;
            }

            AppAction::HideHelp => {
                self.show_help = false;
            }

            AppAction::SearchStart => {
                self.search_active = true;
            }

            AppAction::SearchChar(c) => {
                self.query.push(c);
                self.selected_index = 0;
            }

            AppAction::SearchBackspace => {
                self.query.pop();
                self.selected_index = 0;
            }

            AppAction::SearchConfirm => {
                self.search_active = false;
            }

            AppAction::SearchCancel => {
                self.search_active = false;
                self.query.clear();
                self.selected_index = 0;
            }

            AppAction::DemographicsNextRow | AppAction::DemographicsPrevRow => {
                self.demographics_row = match self.demographics_row {
                    DemographicsRow::Gender => DemographicsRow::AgeGroup,
                    DemographicsRow::AgeGroup => DemographicsRow::Gender,
                };
            }

            AppAction::DemographicsNextOption | AppAction::DemographicsPrevOption => {
                let forward = action == AppAction::DemographicsNextOption;
                if let Some(form) = self.demographics.as_mut() {
                    match self.demographics_row {
                        DemographicsRow::Gender => form.cycle_gender(forward),
                        DemographicsRow::AgeGroup => form.cycle_age_group(forward),
                    }
                }
            }

            AppAction::DemographicsSubmit => {
                self.submit_demographics().await?;
            }

            AppAction::DemographicsCancel => {
                if let Some(session) = self.vote.as_mut() {
                    session.cancel_demographics();
                }
                self.demographics = None;
            }

            AppAction::DraftRestore => {
                if let Some(compose) = self.compose.as_mut() {
                    compose.restore_draft();
                    self.status = Some("Draft restored".to_string());
                }
            }

            AppAction::DraftDiscard => {
                if let Some(compose) = self.compose.as_mut() {
                    compose.discard_draft(&self.local);
                    self.status = Some("Draft discarded".to_string());
                }
            }

            AppAction::FormChar(c) => self.edit_form(FormEdit::Insert(c)),
            AppAction::FormBackspace => self.edit_form(FormEdit::Backspace),

            AppAction::FormNewline => {
                if self.compose_field == Field::Story {
                    self.edit_form(FormEdit::Insert('\n'));
                } else {
                    self.move_form_focus(true);
                }
            }

            AppAction::FormNextField => self.move_form_focus(true),
            AppAction::FormPrevField => self.move_form_focus(false),

            AppAction::FormSubmit => {
                let repo = remote(&self.repository)?;
                if let Some(compose) = self.compose.as_mut() {
                    let post = compose.submit(&self.local, repo).await?;
                    self.compose = None;
                    self.posts.insert(0, post.clone());
                    self.vote = Some(VoteSession::open(post, &self.local));
                    self.screen = Screen::Detail;
                    self.status = Some("Your story is posted".to_string());
                }
            }

            AppAction::FormCancel => {
                // Dropping the session drops any pending autosave
                self.compose = None;
                self.screen = Screen::List;
            }
        }

        Ok(())
    }

    /// Runs the draft autosave when its quiet window has passed.
    pub fn tick_autosave(&mut self, now: Instant) {
        if self.screen != Screen::Write {
            return;
        }
        if let Some(compose) = self.compose.as_mut() {
            compose.tick(now, &self.local);
        }
    }

    pub async fn load_posts(&mut self) -> Result<()> {
        let repo = remote(&self.repository)?;
        self.posts = repo.list_posts().await?;

        let len = self.filtered_posts().len();
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
        Ok(())
    }

    async fn open_post(&mut self, id: &PostId) -> Result<()> {
        let repo = remote(&self.repository)?;
        let post = repo.get_post(id).await?;

        self.vote = Some(VoteSession::open(post, &self.local));
        self.demographics = None;
        self.screen = Screen::Detail;
        Ok(())
    }

    async fn submit_demographics(&mut self) -> Result<()> {
        let repo = remote(&self.repository)?;
        let Some(session) = self.vote.as_mut() else {
            self.demographics = None;
            return Ok(());
        };

        let form = self.demographics.unwrap_or_default();
        match session.submit_demographics(&form, &self.local, repo).await {
            // Keep the prompt open so the user can finish the selection
            Err(e @ AppError::Validation { .. }) => Err(e),
            result => {
                self.demographics = None;
                if let Some(outcome) = result? {
                    self.apply_vote_outcome(outcome);
                }
                Ok(())
            }
        }
    }

    fn apply_vote_outcome(&mut self, outcome: VoteOutcome) {
        match outcome {
            VoteOutcome::DemographicsRequired(_) => {
                self.demographics = Some(DemographicsForm::default());
                self.demographics_row = DemographicsRow::Gender;
            }
            VoteOutcome::Recorded(post) => {
                if let Some(cached) = self.posts.iter_mut().find(|p| p.id == post.id) {
                    *cached = post;
                }
                self.status = Some("Thanks for voting!".to_string());
            }
        }
    }

    fn edit_form(&mut self, edit: FormEdit) {
        let field = self.compose_field;
        let Some(compose) = self.compose.as_mut() else {
            return;
        };

        compose.edit(Instant::now(), |form| {
            if field == Field::Category {
                match edit {
                    FormEdit::Insert('h') | FormEdit::Backspace => {
                        form.category = form.category.prev()
                    }
                    FormEdit::Insert(_) => form.category = form.category.next(),
                }
                return;
            }

            let max = field.max_len();
            if let Some(text) = form.text_mut(field) {
                match edit {
                    FormEdit::Insert(c) => {
                        if max.map_or(true, |max| text.chars().count() < max) {
                            text.push(c);
                        }
                    }
                    FormEdit::Backspace => {
                        text.pop();
                    }
                }
            }
        });
    }

    fn move_form_focus(&mut self, forward: bool) {
        let fields = Field::COMPOSE;
        let idx = fields
            .iter()
            .position(|f| *f == self.compose_field)
            .unwrap_or(0);
        let next = if forward {
            (idx + 1) % fields.len()
        } else {
            (idx + fields.len() - 1) % fields.len()
        };
        self.compose_field = fields[next];
    }

    fn leave_to_list(&mut self) {
        self.vote = None;
        self.demographics = None;
        self.screen = Screen::List;
    }

    fn report(&mut self, err: AppError) {
        let message = match &err {
            AppError::Validation { reason, .. } => reason.clone(),
            AppError::AlreadyVoted => "You have already voted on this post".to_string(),
            AppError::NotFound(id) => {
                tracing::warn!("Post {} not found", id);
                self.leave_to_list();
                "That post could not be found".to_string()
            }
            AppError::Config(message) => message.clone(),
            e if e.is_retryable() => {
                tracing::error!("Remote operation failed: {}", e);
                "Something went wrong, please try again".to_string()
            }
            e => {
                tracing::error!("Operation failed: {}", e);
                e.to_string()
            }
        };
        self.status = Some(message);
    }

    /// Inserts sample posts from a JSON file; returns how many were created.
    pub async fn seed_posts(&mut self, path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)?;
        let seeds: Vec<SeedPost> = serde_json::from_str(&content)?;
        let repo = remote(&self.repository)?;

        let mut created = 0;
        for seed in seeds {
            let new_post = NewPost::from(seed);
            match repo.create_post(&new_post).await {
                Ok(post) => {
                    tracing::info!("Seeded post {} ({})", post.id, post.title);
                    created += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to seed post {}: {}", new_post.title, e);
                }
            }
        }

        self.load_posts().await?;
        Ok(created)
    }
}

#[derive(Debug, Clone, Copy)]
enum FormEdit {
    Insert(char),
    Backspace,
}

fn remote<R>(repository: &Option<R>) -> Result<&R> {
    repository
        .as_ref()
        .ok_or_else(|| AppError::Config(not_configured_message()))
}

fn not_configured_message() -> String {
    format!(
        "Backend not configured: set supabase_url and supabase_anon_key in {}",
        Config::config_path().display()
    )
}
