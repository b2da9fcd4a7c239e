//! Command-line surface for the portal.
//!
//! Each subcommand drives one core operation against the configured API,
//! or against in-process fixtures with `--fixture`. Results go to stdout;
//! diagnostics go through `tracing`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use pagination::PageRequest;
use reqwest::cookie::Jar;
use tracing::warn;

use portal::PortalSettings;
use portal::domain::ports::{
    AuthGateway, CaseRepository, FixtureAuthGateway, FixtureCaseRepository, TokenStore,
};
use portal::domain::{
    CaseCatalogue, CaseId, DonationCase, DonationFlow, Error, FeedView, FilterSpecification,
    IdentityState, LoadOutcome, LoginCredentials, RegisterCredentials, RegistrationForm,
    SessionContext, SessionPorts, SessionService, SortBy, Urgency, apply,
};
use portal::outbound::{
    ApiClient, CookieJarMirror, FileTokenStore, HttpAuthGateway, HttpCaseRepository,
    TracingNavigator,
};

/// `portal` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "portal",
    about = "Donation portal client: session, case feed, donations and edge guard",
    version
)]
pub struct Cli {
    /// Serve auth and cases from in-process fixtures instead of the API.
    #[arg(long, global = true)]
    pub fixture: bool,
    /// Override the API base URL.
    #[arg(long = "api-url", value_name = "url", global = true)]
    pub api_url: Option<String>,
    /// Override the directory holding the stored credential.
    #[arg(long = "token-dir", value_name = "dir", global = true)]
    pub token_dir: Option<PathBuf>,
    /// Override the edge server listen address.
    #[arg(long = "bind-addr", value_name = "addr", global = true)]
    pub bind_addr: Option<String>,
    /// Override the credential cookie name.
    #[arg(long = "cookie-name", value_name = "name", global = true)]
    pub cookie_name: Option<String>,
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Layer the global flags over settings loaded from files and the
    /// environment.
    pub fn apply_overrides(&self, settings: &mut PortalSettings) {
        if let Some(api_url) = &self.api_url {
            settings.api_base_url = Some(api_url.clone());
        }
        if let Some(token_dir) = &self.token_dir {
            settings.token_dir = Some(token_dir.clone());
        }
        if let Some(bind_addr) = &self.bind_addr {
            settings.bind_addr = Some(bind_addr.clone());
        }
        if let Some(cookie_name) = &self.cookie_name {
            settings.cookie_name = Some(cookie_name.clone());
        }
    }
}

/// Portal operations.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the edge server hosting the route guard.
    Serve,
    /// Sign in and store the session credential.
    Login {
        /// Account email.
        #[arg(long)]
        email: String,
        /// Account password.
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in.
    Register(RegisterArgs),
    /// Sign out and forget the stored credential.
    Logout,
    /// Show who the stored credential belongs to.
    #[command(alias = "status")]
    Whoami,
    /// List cases with optional filters and sorting.
    Feed(FeedArgs),
    /// Show one case.
    Case {
        /// Case identifier.
        id: String,
    },
    /// Donate to a case.
    Donate {
        /// Case identifier.
        case_id: String,
        /// Amount in major currency units.
        #[arg(long)]
        amount: f64,
        /// Optional note for the beneficiary.
        #[arg(long)]
        message: Option<String>,
    },
    /// Toggle a case as favourite.
    Favorite {
        /// Case identifier.
        id: String,
    },
}

/// Registration form fields.
#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Given name.
    #[arg(long = "first-name")]
    pub first_name: String,
    /// Family name.
    #[arg(long = "last-name")]
    pub last_name: String,
    /// Account email.
    #[arg(long)]
    pub email: String,
    /// Chosen password.
    #[arg(long)]
    pub password: String,
    /// Password confirmation.
    #[arg(long = "confirm-password")]
    pub confirm_password: String,
    /// Accept the terms and conditions.
    #[arg(long = "accept-terms")]
    pub accept_terms: bool,
}

/// Feed listing options.
#[derive(Debug, Args)]
pub struct FeedArgs {
    /// Category substring, case-insensitive.
    #[arg(long)]
    pub category: Option<String>,
    /// Urgency level: low, medium or high.
    #[arg(long)]
    pub urgency: Option<Urgency>,
    /// Only verified cases.
    #[arg(long)]
    pub verified: bool,
    /// Sort order: newest, ending-soon, most-funded or least-funded.
    #[arg(long)]
    pub sort: Option<SortBy>,
    /// Number of pages to load.
    #[arg(long, default_value_t = 1)]
    pub pages: u32,
    /// Override the configured page size.
    #[arg(long = "page-size")]
    pub page_size: Option<u32>,
    /// Let the API apply the category, urgency and verified filters.
    #[arg(long)]
    pub remote: bool,
}

impl FeedArgs {
    fn filter(&self) -> FilterSpecification {
        FilterSpecification::default()
            .with_category(self.category.as_deref())
            .with_urgency(self.urgency)
            .with_verified_only(self.verified)
            .with_sort(self.sort)
    }
}

/// Adapters and services for one CLI invocation.
pub struct Portal {
    settings: PortalSettings,
    context: SessionContext,
    repository: Arc<dyn CaseRepository>,
    navigator: Arc<TracingNavigator>,
}

impl Portal {
    /// Wire adapters from settings.
    ///
    /// The token store is always the file store so sessions persist across
    /// invocations; `fixture` swaps only the remote boundaries.
    pub fn build(settings: PortalSettings, fixture: bool) -> color_eyre::Result<Self> {
        let base_url = settings.api_base_url()?;
        let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::open(settings.token_dir())?);
        let mirror = Arc::new(CookieJarMirror::new(
            Arc::new(Jar::default()),
            settings.edge_origin()?,
            settings.cookie_name(),
        ));
        let navigator = Arc::new(TracingNavigator::default());

        let (gateway, repository): (Arc<dyn AuthGateway>, Arc<dyn CaseRepository>) = if fixture {
            (
                Arc::new(FixtureAuthGateway),
                Arc::new(FixtureCaseRepository::default()),
            )
        } else {
            let client = ApiClient::new(base_url, settings.request_timeout())?;
            (
                Arc::new(HttpAuthGateway::new(client.clone())),
                Arc::new(HttpCaseRepository::new(client, Arc::clone(&store))),
            )
        };

        let session = SessionService::new(
            SessionPorts {
                store,
                mirror,
                gateway,
                navigator: navigator.clone(),
            },
            settings.login_path(),
        );
        Ok(Self {
            settings,
            context: SessionContext::new(Arc::new(session)),
            repository,
            navigator,
        })
    }

    /// Run one non-server command.
    pub async fn run(&self, command: Command) -> Result<(), Error> {
        match command {
            Command::Serve => Err(Error::internal("serve is handled by the entry point")),
            Command::Login { email, password } => self.login(&email, &password).await,
            Command::Register(args) => self.register(&args).await,
            Command::Logout => self.logout(),
            Command::Whoami => {
                self.whoami().await;
                Ok(())
            }
            Command::Feed(args) => self.feed(&args).await,
            Command::Case { id } => self.case(&id).await,
            Command::Donate {
                case_id,
                amount,
                message,
            } => self.donate(&case_id, amount, message.as_deref()).await,
            Command::Favorite { id } => self.favorite(&id).await,
        }
    }

    async fn login(&self, email: &str, password: &str) -> Result<(), Error> {
        let credentials = LoginCredentials::try_from_parts(email, password)
            .map_err(|err| Error::validation(err.to_string()))?;
        let identity = self.context.login(&credentials).await?;
        println!("signed in as {} <{}>", identity.full_name(), identity.email());
        Ok(())
    }

    async fn register(&self, args: &RegisterArgs) -> Result<(), Error> {
        let credentials = RegisterCredentials::try_from_form(RegistrationForm {
            first_name: &args.first_name,
            last_name: &args.last_name,
            email: &args.email,
            password: &args.password,
            confirm_password: &args.confirm_password,
            accept_terms: args.accept_terms,
        })
        .map_err(|err| Error::validation(err.to_string()))?;
        let identity = self.context.register(&credentials).await?;
        println!("registered {} <{}>", identity.full_name(), identity.email());
        Ok(())
    }

    fn logout(&self) -> Result<(), Error> {
        let result = self.context.logout();
        if let Some(path) = self.navigator.last_redirect() {
            println!("signed out; continue at {path}");
        }
        result
    }

    async fn whoami(&self) {
        match self.context.initialise().await {
            IdentityState::Authenticated(identity) => {
                println!("{} <{}> ({})", identity.full_name(), identity.email(), identity.id());
            }
            IdentityState::Anonymous | IdentityState::Unknown => println!("not signed in"),
        }
    }

    async fn feed(&self, args: &FeedArgs) -> Result<(), Error> {
        self.context.initialise().await;
        let page_size = args.page_size.unwrap_or_else(|| self.settings.page_size());
        if args.remote {
            return self.search(args, page_size).await;
        }
        let view = FeedView::new(Arc::clone(&self.repository), page_size)
            .map_err(|err| Error::validation(err.to_string()))?;
        view.set_filter(args.filter());

        for _ in 0..args.pages.max(1) {
            match view.load_more().await {
                Ok(LoadOutcome::Exhausted) => break,
                Ok(LoadOutcome::Loaded { .. } | LoadOutcome::AlreadyInFlight) => {}
                Err(err) if view.loaded().is_empty() => return Err(err),
                Err(err) => {
                    warn!(error = %err, "stopped loading further pages");
                    break;
                }
            }
        }

        for case in view.visible() {
            println!("{}", summary_line(&case));
        }
        let stats = view.stats();
        println!(
            "{} cases loaded, {} raised, {} verified, {} urgent{}",
            stats.case_count,
            stats.total_raised,
            stats.verified_count,
            stats.high_urgency_count,
            if view.is_exhausted() { "" } else { " (more available)" },
        );
        Ok(())
    }

    async fn search(&self, args: &FeedArgs, page_size: u32) -> Result<(), Error> {
        let filter = args.filter();
        let catalogue = CaseCatalogue::new(Arc::clone(&self.repository));
        let mut next = Some(
            PageRequest::first(page_size).map_err(|err| Error::validation(err.to_string()))?,
        );
        let mut cases = Vec::new();
        for _ in 0..args.pages.max(1) {
            let Some(request) = next else { break };
            let page = catalogue.search(&filter, request).await?;
            next = page.next_request();
            cases.extend(page.into_items());
        }

        for case in apply(&cases, &filter) {
            println!("{}", summary_line(&case));
        }
        println!(
            "{} matching cases{}",
            cases.len(),
            if next.is_some() { " (more available)" } else { "" },
        );
        Ok(())
    }

    async fn case(&self, id: &str) -> Result<(), Error> {
        self.context.initialise().await;
        let case = CaseCatalogue::new(Arc::clone(&self.repository))
            .find(&parse_case_id(id)?)
            .await?;
        println!("{}", summary_line(&case));
        println!("  {}", case.description());
        println!(
            "  {} in {}, for {}{}",
            case.category(),
            case.location(),
            case.beneficiary_name(),
            if case.is_verified() { " (verified)" } else { "" },
        );
        println!(
            "  {} of {} raised, {} remaining, {} days left",
            case.current_amount(),
            case.target_amount(),
            case.remaining(),
            case.days_left(),
        );
        Ok(())
    }

    async fn donate(&self, id: &str, amount: f64, message: Option<&str>) -> Result<(), Error> {
        self.context.initialise().await;
        let case = CaseCatalogue::new(Arc::clone(&self.repository))
            .find(&parse_case_id(id)?)
            .await?;
        let mut flow = DonationFlow::new(Arc::clone(&self.repository));
        if flow.preview(&case, amount)?.exceeds_remaining() {
            println!(
                "note: {} exceeds the {} still needed",
                amount,
                case.remaining()
            );
        }
        let accepted = flow.submit(&case, amount, message).await?;
        println!("thank you: donated {accepted} to \"{}\"", case.title());
        Ok(())
    }

    async fn favorite(&self, id: &str) -> Result<(), Error> {
        self.context.initialise().await;
        let is_favorite = CaseCatalogue::new(Arc::clone(&self.repository))
            .toggle_favorite(&parse_case_id(id)?)
            .await?;
        println!(
            "{id} {}",
            if is_favorite { "added to favourites" } else { "removed from favourites" }
        );
        Ok(())
    }
}

fn parse_case_id(raw: &str) -> Result<CaseId, Error> {
    CaseId::new(raw).map_err(|err| Error::validation(err.to_string()))
}

fn summary_line(case: &DonationCase) -> String {
    format!(
        "[{}] {} | {} | {:.0}% funded | {} urgency | {} days left",
        case.id(),
        case.title(),
        case.category(),
        case.progress_percent(),
        case.urgency(),
        case.days_left(),
    )
}
