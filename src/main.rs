use clap::{Parser, Subcommand};
use vidgrab::daemon;

// --- Command-Line Argument Parsing ---
#[derive(Parser, Debug)]
#[command(author, version, about = "Pick a quality and download a video from its page URL.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manages the web server process.
    Server {
        #[command(subcommand)]
        action: ServerAction,
    },
}

#[derive(Subcommand, Debug)]
enum ServerAction {
    /// Start the server as a background process.
    Start,
    /// Stop the background server process.
    Stop,
    /// Restart the background server process.
    Restart,
    /// Run the server in the foreground.
    Run,
    /// Check the status of the background server process.
    Status,
}

// The runtime is built per action so `start` can fork before any threads exist.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Server { action } => match action {
            ServerAction::Start => start_server()?,
            ServerAction::Stop => daemon::stop()?,
            ServerAction::Restart => {
                daemon::stop()?;
                std::thread::sleep(std::time::Duration::from_secs(1));
                start_server()?;
            }
            ServerAction::Run => run_foreground()?,
            ServerAction::Status => daemon::status()?,
        },
    }

    Ok(())
}

fn run_foreground() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tokio::runtime::Runtime::new()?.block_on(vidgrab::run_server())
}

/// Detaches a server process using platform-specific logic.
fn start_server() -> anyhow::Result<()> {
    if let Some(pid) = daemon::running_pid()? {
        println!("Server is already running with PID: {}", pid);
        return Ok(());
    }

    let pid_file = daemon::pid_path()?;
    println!("Starting server in the background...");
    println!("PID file at: {}", pid_file.display());

    #[cfg(unix)]
    {
        use daemonize::Daemonize;

        let log = std::fs::File::create(daemon::log_path()?)?;
        let daemonize = Daemonize::new()
            .pid_file(&pid_file)
            .working_directory(std::env::current_dir()?)
            .stdout(log.try_clone()?)
            .stderr(log);

        // Only the detached child returns from `start`.
        daemonize
            .start()
            .map_err(|e| anyhow::anyhow!("failed to daemonize: {}", e))?;
        run_foreground()?;
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x08000000;

        let child = std::process::Command::new(std::env::current_exe()?)
            .arg("server")
            .arg("run")
            .creation_flags(CREATE_NO_WINDOW)
            .spawn()?;
        std::fs::write(&pid_file, child.id().to_string())?;
        println!("Server started successfully.");
    }

    Ok(())
}
