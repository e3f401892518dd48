use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sis", version, about = "School timetable and substitutions CLI")]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Composed timetables and room checks
    Schedule {
        #[command(subcommand)]
        action: commands::schedule::ScheduleAction,
    },
    /// Substitutions and the daily substitution table
    Subs {
        #[command(subcommand)]
        action: commands::subs::SubsAction,
    },
    /// Canonical weekly lessons
    Lesson {
        #[command(subcommand)]
        action: commands::lesson::LessonAction,
    },
    /// Classes and courses
    Group {
        #[command(subcommand)]
        action: commands::group::GroupAction,
    },
    /// Teachers
    Educator {
        #[command(subcommand)]
        action: commands::educator::EducatorAction,
    },
    /// Students and their group memberships
    Student {
        #[command(subcommand)]
        action: commands::student::StudentAction,
    },
    /// Subjects
    Subject {
        #[command(subcommand)]
        action: commands::subject::SubjectAction,
    },
    /// Timetable versions
    Version {
        #[command(subcommand)]
        action: commands::version::VersionAction,
    },
    /// What a student or educator attends right now
    Now(commands::now::NowArgs),
    /// Lucky numbers
    Lucky {
        #[command(subcommand)]
        action: commands::lucky::LuckyAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    let result = match cli.command {
        Commands::Schedule { action } => commands::schedule::run(action),
        Commands::Subs { action } => commands::subs::run(action),
        Commands::Lesson { action } => commands::lesson::run(action),
        Commands::Group { action } => commands::group::run(action),
        Commands::Educator { action } => commands::educator::run(action),
        Commands::Student { action } => commands::student::run(action),
        Commands::Subject { action } => commands::subject::run(action),
        Commands::Version { action } => commands::version::run(action),
        Commands::Now(args) => commands::now::run(args),
        Commands::Lucky { action } => commands::lucky::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
