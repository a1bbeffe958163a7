//! Screen loop
//!
//! Runs one screen at a time on top of the core view models. A screen ends
//! when its view navigates (the route arrives on the router channel) or when
//! the user quits.

use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use chatbot_core::api::{ApiClient, AuthClient};
use chatbot_core::views::{ChatView, LoginView, SendOutcome, SignUpView, SubmitOutcome};
use chatbot_core::{Navigator, Route};

use crate::commands::{self, Command};
use crate::config::Config;
use crate::i18n::I18n;
use crate::render;

/// Line-oriented stdin reader
struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Print `label` and read one line; `None` on end of input.
    async fn ask(&mut self, label: &str) -> Result<Option<String>> {
        print!("{label}> ");
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?)
    }
}

pub struct App {
    api: Arc<ApiClient>,
    auth: Arc<AuthClient>,
    config: Config,
    i18n: I18n,
    prompt: Prompt,
    router: UnboundedSender<Route>,
    routes: UnboundedReceiver<Route>,
}

impl App {
    pub fn new(api: Arc<ApiClient>, auth: Arc<AuthClient>, config: Config, i18n: I18n) -> Self {
        let (router, routes) = mpsc::unbounded_channel();
        Self {
            api,
            auth,
            config,
            i18n,
            prompt: Prompt::new(),
            router,
            routes,
        }
    }

    fn navigator(&self) -> Arc<dyn Navigator> {
        Arc::new(self.router.clone())
    }

    pub async fn run(mut self, start: Route) -> Result<()> {
        let mut route = start;
        loop {
            tracing::debug!("Showing {}", route.path());
            let next = match route {
                Route::SignUp => self.sign_up().await?,
                Route::Login => self.login().await?,
                Route::Chat => self.chat().await?,
            };
            match next {
                Some(next) => route = next,
                None => return Ok(()),
            }
        }
    }

    // ========================================================================
    // Sign-up
    // ========================================================================

    async fn sign_up(&mut self) -> Result<Option<Route>> {
        let view = SignUpView::new(self.auth.clone(), self.navigator())
            .with_redirect_delay(self.config.redirect_delay());
        let t = |key: &str| self.i18n.t(key);

        println!("\n== {} ==", t("signup.title"));
        println!("{}", t("signup.have_account"));

        loop {
            let Some(email) = self.prompt.ask(&t("signup.email")).await? else {
                return Ok(None);
            };
            if email.trim() == "/login" {
                return Ok(Some(Route::Login));
            }
            let Some(password) = self.prompt.ask(&t("signup.password")).await? else {
                return Ok(None);
            };
            view.set_email(&email);
            view.set_password(&password);

            println!("{}", t("signup.submitting"));
            if view.submit().await == SubmitOutcome::Submitted {
                println!("{}", t("signup.success"));
                println!("{}", t("signup.confirm_email"));
                println!("{}", t("signup.redirecting"));
                return Ok(self.routes.recv().await);
            }
            if let Some(error) = view.snapshot().error {
                println!("{}", render::error(&error, &self.i18n));
            }
        }
    }

    // ========================================================================
    // Login
    // ========================================================================

    async fn login(&mut self) -> Result<Option<Route>> {
        let view = LoginView::new(self.auth.clone(), self.navigator());
        let t = |key: &str| self.i18n.t(key);

        println!("\n== {} ==", t("login.title"));
        println!("{}", t("login.no_account"));

        loop {
            let Some(email) = self.prompt.ask(&t("login.email")).await? else {
                return Ok(None);
            };
            if email.trim() == "/signup" {
                return Ok(Some(Route::SignUp));
            }
            let Some(password) = self.prompt.ask(&t("login.password")).await? else {
                return Ok(None);
            };
            view.set_email(&email);
            view.set_password(&password);

            println!("{}", t("login.submitting"));
            if view.submit().await == SubmitOutcome::Submitted {
                return Ok(self.routes.recv().await);
            }
            if let Some(error) = view.snapshot().error {
                println!("{}", render::error(&error, &self.i18n));
            }
        }
    }

    // ========================================================================
    // Chat
    // ========================================================================

    async fn chat(&mut self) -> Result<Option<Route>> {
        let view = ChatView::new(self.api.clone(), self.auth.clone(), self.navigator());
        let mut revisions = view.subscribe();
        let mut shown_error: Option<String> = None;

        println!("\n== {} ==", self.i18n.t("app.title"));
        if let Some(email) = view.user_email() {
            println!("{}", self.i18n.format("chat.signed_in_as", &[("email", &email)]));
        }
        view.mount().await;
        println!("{}", render::conversation_list(&view.snapshot(), &self.i18n));
        println!("{}", self.i18n.t("chat.empty"));

        loop {
            let state = view.snapshot();

            // Keep the newest message in view
            if revisions.has_changed().unwrap_or(false) {
                revisions.borrow_and_update();
                println!(
                    "{}",
                    render::transcript(&state.messages, &self.i18n, render::TRANSCRIPT_TAIL)
                );
            }
            if state.error != shown_error {
                if let Some(error) = &state.error {
                    println!("{}", render::error(error, &self.i18n));
                }
                shown_error = state.error.clone();
            }

            let label = match &state.current {
                Some(conversation) => conversation.title.clone(),
                None => self.i18n.t("chat.prompt"),
            };
            let Some(line) = self.prompt.ask(&label).await? else {
                return Ok(None);
            };

            match commands::parse(&line) {
                Command::Send(text) => {
                    if state.current.is_none() {
                        println!("{}", self.i18n.t("chat.empty"));
                        continue;
                    }
                    view.set_input(&text);
                    println!("{}", self.i18n.t("chat.sending"));
                    if view.send_message().await == SendOutcome::Ignored {
                        tracing::debug!("Send ignored");
                    }
                }
                Command::NewConversation => {
                    view.new_conversation().await;
                    if let Some(conversation) = view.snapshot().current {
                        println!(
                            "{}",
                            self.i18n.format("chat.opened", &[("title", &conversation.title)])
                        );
                    }
                }
                Command::ListConversations => {
                    println!("{}", render::conversation_list(&state, &self.i18n));
                }
                Command::Open(index) => match state.conversations.get(index - 1) {
                    Some(conversation) => {
                        println!(
                            "{}",
                            self.i18n.format("chat.opened", &[("title", &conversation.title)])
                        );
                        view.select_conversation(&conversation.id).await;
                    }
                    None => println!(
                        "{}",
                        self.i18n
                            .format("chat.no_such_conversation", &[("index", &index.to_string())])
                    ),
                },
                Command::SignOut => {
                    view.sign_out().await;
                    return Ok(self.routes.recv().await);
                }
                Command::Help => println!("{}", self.i18n.t("chat.help")),
                Command::Quit => return Ok(None),
                Command::Nothing => {}
                Command::Unknown(command) => println!(
                    "{}",
                    self.i18n.format("chat.unknown_command", &[("command", &command)])
                ),
            }
        }
    }
}
