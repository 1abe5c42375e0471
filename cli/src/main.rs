use clap::{Args, Parser, Subcommand, ValueEnum};
use common::{InstanceInfo, JobKey, LoginRequest, SchedulerName, TriggerKey};
use schedcenter::config::Config;
use schedcenter::notifier::TerminalNotifier;
use schedcenter::{render, Console, HttpApi, SchedulerApi, Selection, TableController, TableVariant};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (.yaml, .yml or .toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Scheduler center base URL
    #[arg(long, global = true, env = "SCHEDCENTER_BASE_URL")]
    base_url: Option<String>,
    /// More log output (repeatable)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct JobArgs {
    /// Scheduler name
    #[arg(long)]
    sched: String,
    /// Job name
    #[arg(long)]
    job: String,
    /// Job group
    #[arg(long)]
    group: String,
}

impl JobArgs {
    fn key(self) -> JobKey {
        JobKey {
            sched_name: SchedulerName(self.sched),
            job_name: self.job,
            job_group: self.group,
        }
    }
}

#[derive(Args)]
struct TriggerArgs {
    /// Scheduler name
    #[arg(long)]
    sched: String,
    /// Trigger name
    #[arg(long)]
    trigger: String,
    /// Trigger group
    #[arg(long)]
    group: String,
}

impl TriggerArgs {
    fn key(self) -> TriggerKey {
        TriggerKey {
            sched_name: SchedulerName(self.sched),
            trigger_name: self.trigger,
            trigger_group: self.group,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive console
    Console {
        /// Which view to open
        #[arg(long)]
        view: Option<TableVariant>,
        /// Scheduler to select on start
        #[arg(long)]
        sched: Option<String>,
    },
    /// List scheduler names
    Names,
    /// List jobs
    List {
        /// Only jobs of this scheduler
        #[arg(long)]
        sched: Option<String>,
        #[arg(long, value_enum, default_value = "table")]
        format: Format,
    },
    /// Scheduler instances
    #[command(subcommand)]
    Instances(InstanceCommands),
    /// Fire a job now
    Trigger(JobArgs),
    /// Re-read a trigger from its scheduler
    Refresh(TriggerArgs),
    /// Pause a job
    Pause(JobArgs),
    /// Resume a job
    Resume(JobArgs),
    /// Remove a trigger from the scheduler center
    RemoveLocal(TriggerArgs),
    /// Delete a job
    Delete(JobArgs),
    /// Check credentials against the scheduler center
    Login {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
enum InstanceCommands {
    /// List registered instances
    List {
        /// Only instances of this scheduler
        #[arg(long)]
        sched: Option<String>,
    },
    /// Unregister an instance
    Delete {
        /// Scheduler name
        #[arg(long)]
        sched: String,
        /// Instance name
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = cli.base_url {
        config.server.base_url = url;
    }
    schedcenter::logging::setup_logging(&config.logging, cli.verbose)?;

    let api = HttpApi::new(&config.server.base_url, config.server.timeout())?;
    log::debug!("using scheduler center at {}", api.base_url());

    if !matches!(cli.command, Commands::Login { .. }) {
        if let Some(credentials) = config.auth.credentials() {
            api.login(&credentials).await?;
            log::info!("logged in as {}", credentials.username);
        }
    }

    run(cli.command, api, &config).await
}

async fn run(command: Commands, api: HttpApi, config: &Config) -> anyhow::Result<()> {
    match command {
        Commands::Console { view, sched } => {
            let variant = view.unwrap_or(config.console.view);
            let mut console = Console::new(Arc::new(api), Arc::new(TerminalNotifier::new()), variant);
            console.start(sched.as_deref()).await;
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            console.run(stdin, std::io::stdout()).await?;
        }
        Commands::Names => {
            for name in api.sched_names().await? {
                println!("{}", name);
            }
        }
        Commands::List { sched, format } => {
            let selection = match sched {
                Some(name) => Selection::Scheduler(SchedulerName(name)),
                None => Selection::All,
            };
            let table = TableController::new(TableVariant::List);
            table.load(&api, &selection).await?;
            match format {
                Format::Table => println!("{}", table.with_table(render::job_table)),
                Format::Csv => table.with_table(|t| render::job_csv(t, std::io::stdout()))?,
            }
        }
        Commands::Instances(InstanceCommands::List { sched }) => {
            let sched = sched.map(SchedulerName);
            let instances = api.list_instances(sched.as_ref()).await?;
            println!("{}", render::instances(&instances));
        }
        Commands::Instances(InstanceCommands::Delete { sched, name, host, port }) => {
            api.delete_instance(&InstanceInfo {
                sched_name: SchedulerName(sched),
                instance_name: name,
                instance_host: host,
                instance_port: port,
            })
            .await?;
            println!("Success");
        }
        Commands::Trigger(args) => {
            api.trigger_job(&args.key()).await?;
            println!("Job triggered.");
        }
        Commands::Refresh(args) => {
            let row = api.refresh_trigger(&args.key()).await?;
            let mut table = schedcenter::JobTable::new(TableVariant::List);
            let ticket = table.begin_load();
            table.complete_load(ticket, vec![row]);
            println!("{}", render::job_table(&table));
        }
        Commands::Pause(args) => {
            api.pause_job(&args.key()).await?;
            println!("Success");
        }
        Commands::Resume(args) => {
            api.resume_job(&args.key()).await?;
            println!("Success");
        }
        Commands::RemoveLocal(args) => {
            api.remove_local(&args.key()).await?;
            println!("Success");
        }
        Commands::Delete(args) => {
            api.delete_job(&args.key()).await?;
            println!("Success");
        }
        Commands::Login { username, password } => {
            let credentials = LoginRequest {
                username: username.or_else(|| config.auth.username.clone()).unwrap_or_default(),
                password: password.or_else(|| config.auth.password.clone()).unwrap_or_default(),
            };
            api.login(&credentials).await?;
            println!("Logged in as {}", credentials.username);
        }
    }

    Ok(())
}
