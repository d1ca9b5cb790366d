//! Executes a materialized [`LaunchPlan`] against real OS processes and
//! loopback TCP sockets.
//!
//! Every step in a plan's `steps` is either a one-shot setup action
//! (`Prologue`, `Preamble`), a long-lived concurrent task (`Proxy`, `Worker`,
//! `EdgePipe`), or a closing announcement (`Entrypoints`, `Epilogue`). The
//! concurrent tasks are spawned onto the current `tokio` runtime and joined
//! at the end; a failure in any one of them cancels the rest via the
//! `tokio_util`-free route of a shared `CancellationToken`-less `select!` on
//! a broadcast channel, matching the rest of the workspace's preference for
//! explicit channels over a dedicated cancellation crate.

use std::io::SeekFrom;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use chrono::Local;
use pipeline_common::timestamp_prefix;
use pipeline_graph::EdgeType;
use pipeline_topology::ProxyStep;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::process::Command;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::RunError;
use crate::plan::{EdgePipeStep, EntrypointInfo, LaunchMode, LaunchPlan, LaunchStep, WorkerStep};

const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Run `plan` to completion (or until one of its workers fails, or the
/// process receives Ctrl-C).
pub async fn run(plan: LaunchPlan) -> Result<(), RunError> {
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let mut tasks = JoinSet::new();
    let mut entrypoints = Vec::new();

    for step in plan.steps {
        match step {
            LaunchStep::Prologue { logs_dir } => {
                tokio::fs::create_dir_all(&logs_dir)
                    .await
                    .map_err(|source| RunError::LogsDir {
                        path: logs_dir.clone(),
                        source,
                    })?;
                info!(logs_dir = %logs_dir.display(), "prepared logs directory");
            }
            LaunchStep::Preamble(command) => run_preamble(&command, &plan.logs_dir).await?,
            LaunchStep::Proxy(proxy) => spawn_proxy(&mut tasks, proxy, shutdown_tx.subscribe()),
            LaunchStep::Worker(worker) => spawn_worker(&mut tasks, worker, shutdown_tx.clone()),
            LaunchStep::EdgePipe(edge) => spawn_edge_pipe(&mut tasks, edge, shutdown_tx.subscribe()),
            LaunchStep::Entrypoints(points) => entrypoints = points,
            LaunchStep::Epilogue { mode, component_count } => {
                announce_entrypoints(&entrypoints);
                run_epilogue(mode, component_count, &plan.logs_dir, &mut tasks, shutdown_tx.clone()).await?;
            }
        }
    }

    drain(&mut tasks).await
}

async fn drain(tasks: &mut JoinSet<Result<(), RunError>>) -> Result<(), RunError> {
    let mut first_err = None;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!(%err, "task ended with an error");
                first_err.get_or_insert(err);
            }
            Err(join_err) => {
                warn!(%join_err, "task panicked");
            }
        }
    }
    match first_err {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn announce_entrypoints(entrypoints: &[EntrypointInfo]) {
    for point in entrypoints {
        info!(
            node = %point.node_name,
            port = point.stdin_port,
            "entry point ready: connect to 127.0.0.1:{} to feed {}",
            point.stdin_port,
            point.node_name
        );
    }
}

async fn run_preamble(command: &str, logs_dir: &Path) -> Result<(), RunError> {
    if command.trim().is_empty() {
        return Ok(());
    }
    let log_path = logs_dir.join("preamble.log");
    let output = shell_command(command)
        .output()
        .await
        .map_err(|source| RunError::SpawnWorker {
            name: "preamble".to_string(),
            source,
        })?;

    let mut log = File::create(&log_path).await?;
    log.write_all(&output.stdout).await?;
    log.write_all(&output.stderr).await?;

    if !output.status.success() {
        return Err(RunError::PreambleFailed {
            code: output.status.code().unwrap_or(-1),
        });
    }
    Ok(())
}

fn shell_command(command: &str) -> Command {
    #[cfg(unix)]
    {
        let mut cmd = Command::new("/bin/sh");
        cmd.arg("-c").arg(command);
        cmd
    }
    #[cfg(not(unix))]
    {
        let mut cmd = Command::new("cmd.exe");
        cmd.arg("/c").arg(command);
        cmd
    }
}

fn spawn_worker(tasks: &mut JoinSet<Result<(), RunError>>, worker: WorkerStep, shutdown: broadcast::Sender<()>) {
    tasks.spawn(async move {
        let name = worker.name.clone();
        let mut cmd = shell_command(&worker.command);
        cmd.stdin(if worker.stdin_port.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        cmd.stdout(if worker.stdout_fanout_ports.is_empty() {
            Stdio::null()
        } else {
            Stdio::piped()
        });
        cmd.stderr(Stdio::piped());
        #[cfg(unix)]
        cmd.kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| RunError::SpawnWorker {
            name: name.clone(),
            source,
        })?;

        if let Some(pid) = child.id() {
            if let Ok(mut pid_file) = File::create(&worker.pid_file).await {
                let _ = pid_file.write_all(pid.to_string().as_bytes()).await;
            }
        }

        if let Some(mut stderr) = child.stderr.take() {
            let mut err_log = File::create(&worker.err_log).await?;
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                loop {
                    match stderr.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            let line = format!("{} {}", timestamp_prefix(Local::now()), String::from_utf8_lossy(&buf[..n]));
                            let _ = err_log.write_all(line.as_bytes()).await;
                        }
                    }
                }
            });
        }

        if let (Some(port), Some(mut stdin)) = (worker.stdin_port, child.stdin.take()) {
            tokio::spawn(async move {
                if let Ok(listener) = bind(port).await {
                    if let Ok((mut socket, _)) = listener.accept().await {
                        let _ = tokio::io::copy(&mut socket, &mut stdin).await;
                    }
                }
            });
        }

        if !worker.stdout_fanout_ports.is_empty() {
            if let Some(stdout) = child.stdout.take() {
                let ports = worker.stdout_fanout_ports.clone();
                tokio::spawn(async move {
                    let _ = tee_stdout(stdout, ports).await;
                });
            }
        }

        let status = child.wait().await.map_err(|source| RunError::SpawnWorker {
            name: name.clone(),
            source,
        })?;
        let _ = shutdown.send(());

        if !status.success() {
            return Err(RunError::WorkerFailed {
                name,
                status: status.to_string(),
            });
        }
        Ok(())
    });
}

async fn tee_stdout(mut stdout: impl tokio::io::AsyncRead + Unpin, ports: Vec<u16>) -> Result<(), RunError> {
    let mut sinks = Vec::with_capacity(ports.len());
    for port in ports {
        sinks.push(connect_with_retry(port).await?);
    }
    let mut buf = [0u8; 8192];
    loop {
        let n = stdout.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        for sink in &mut sinks {
            sink.write_all(&buf[..n]).await?;
        }
    }
    Ok(())
}

fn spawn_edge_pipe(tasks: &mut JoinSet<Result<(), RunError>>, edge: EdgePipeStep, mut shutdown: broadcast::Receiver<()>) {
    tasks.spawn(async move {
        tokio::select! {
            result = run_edge_pipe(edge) => result,
            _ = shutdown.recv() => Ok(()),
        }
    });
}

async fn run_edge_pipe(edge: EdgePipeStep) -> Result<(), RunError> {
    let listener = bind(edge.from_port).await?;
    let (mut producer, _) = listener.accept().await?;
    let mut consumer = connect_with_retry(edge.to_port).await?;

    let mut log = match &edge.log {
        Some(edge_log) => Some(File::create(&edge_log.path).await?),
        None => None,
    };

    let mut buf = [0u8; 8192];
    loop {
        let n = producer.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        consumer.write_all(&buf[..n]).await?;
        if let Some(log) = log.as_mut() {
            write_edge_log(log, &edge.log.as_ref().unwrap().edge_type, &buf[..n]).await?;
        }
    }
    Ok(())
}

async fn write_edge_log(log: &mut File, edge_type: &EdgeType, chunk: &[u8]) -> Result<(), RunError> {
    match edge_type {
        EdgeType::Binary | EdgeType::None => {
            log.write_all(chunk).await?;
        }
        EdgeType::Text => {
            let prefix = timestamp_prefix(Local::now());
            for line in String::from_utf8_lossy(chunk).lines() {
                log.write_all(format!("{prefix} {line}\n").as_bytes()).await?;
            }
        }
    }
    Ok(())
}

fn spawn_proxy(tasks: &mut JoinSet<Result<(), RunError>>, proxy: ProxyStep, mut shutdown: broadcast::Receiver<()>) {
    tasks.spawn(async move {
        tokio::select! {
            result = run_proxy(proxy) => result,
            _ = shutdown.recv() => Ok(()),
        }
    });
}

async fn run_proxy(proxy: ProxyStep) -> Result<(), RunError> {
    match proxy {
        ProxyStep::FanOut {
            listen_port,
            fan_out_ports,
            ..
        } => run_fan_out(listen_port, fan_out_ports).await,
        ProxyStep::SelfLoop {
            listen_port,
            connect_port,
            fan_out_ports,
            ..
        } => run_self_loop(listen_port, connect_port, fan_out_ports).await,
    }
}

async fn run_fan_out(listen_port: u16, fan_out_ports: Vec<u16>) -> Result<(), RunError> {
    let listener = bind(listen_port).await?;
    let (mut producer, _) = listener.accept().await?;
    let mut sinks = Vec::with_capacity(fan_out_ports.len());
    for port in fan_out_ports {
        sinks.push(connect_with_retry(port).await?);
    }
    let mut buf = [0u8; 8192];
    loop {
        let n = producer.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        for sink in &mut sinks {
            sink.write_all(&buf[..n]).await?;
        }
    }
    Ok(())
}

async fn run_self_loop(listen_port: u16, connect_port: u16, fan_out_ports: Vec<u16>) -> Result<(), RunError> {
    let worker_link = connect_with_retry(connect_port).await?;
    let (mut worker_read, mut worker_write) = tokio::io::split(worker_link);

    let listener = bind(listen_port).await?;
    let (producer, _) = listener.accept().await?;
    let (mut producer_read, _producer_write) = tokio::io::split(producer);

    tokio::spawn(async move {
        let mut buf = [0u8; 8192];
        loop {
            match producer_read.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if worker_write.write_all(&buf[..n]).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    let mut sinks = Vec::with_capacity(fan_out_ports.len());
    for port in fan_out_ports {
        sinks.push(connect_with_retry(port).await?);
    }

    let mut buf = [0u8; 8192];
    loop {
        let n = worker_read.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        for sink in &mut sinks {
            sink.write_all(&buf[..n]).await?;
        }
    }
    Ok(())
}

async fn bind(port: u16) -> Result<TcpListener, RunError> {
    TcpListener::bind(("127.0.0.1", port))
        .await
        .map_err(|source| RunError::Bind { port, source })
}

/// Poll `port` until a listener is bound and accepts, with no ceiling on
/// elapsed time -- a downstream worker may still be loading a model, and the
/// whole point of this retry is staying insensitive to how long that takes.
async fn connect_with_retry(port: u16) -> Result<TcpStream, RunError> {
    loop {
        match TcpStream::connect(("127.0.0.1", port)).await {
            Ok(stream) => return Ok(stream),
            Err(_) => tokio::time::sleep(CONNECT_RETRY_DELAY).await,
        }
    }
}

async fn run_epilogue(
    mode: LaunchMode,
    component_count: usize,
    logs_dir: &Path,
    tasks: &mut JoinSet<Result<(), RunError>>,
    shutdown: broadcast::Sender<()>,
) -> Result<(), RunError> {
    match mode {
        LaunchMode::Tail => {
            info!(component_count, "launch plan running; tailing worker logs");
            let logs_dir = logs_dir.to_path_buf();
            tasks.spawn(async move {
                tail_directory(&logs_dir, shutdown.subscribe()).await;
                Ok(())
            });
        }
        LaunchMode::Monitor => {
            info!(component_count, "launch plan running in monitor mode");
        }
        LaunchMode::Silent => {
            debug!(component_count, "launch plan running silently");
        }
        LaunchMode::None => {}
    }
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            let _ = shutdown.send(());
        }
    }
    Ok(())
}

/// Follow every `.err` file already present in `logs_dir`, printing new
/// lines as they're appended, until `shutdown` fires.
#[allow(clippy::print_stdout)]
async fn tail_directory(logs_dir: &Path, mut shutdown: broadcast::Receiver<()>) {
    let mut read_dir = match tokio::fs::read_dir(logs_dir).await {
        Ok(dir) => dir,
        Err(err) => {
            warn!(%err, "could not open logs directory for tailing");
            return;
        }
    };

    let mut offsets = Vec::new();
    while let Ok(Some(entry)) = read_dir.next_entry().await {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("err") {
            offsets.push((path, 0u64));
        }
    }

    loop {
        for (path, offset) in &mut offsets {
            if let Ok(mut file) = File::open(&path).await {
                if file.seek(SeekFrom::Start(*offset)).await.is_ok() {
                    let mut buf = Vec::new();
                    if file.read_to_end(&mut buf).await.is_ok() && !buf.is_empty() {
                        *offset += buf.len() as u64;
                        print!("{}", String::from_utf8_lossy(&buf));
                    }
                }
            }
        }
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(250)) => {}
            _ = shutdown.recv() => return,
        }
    }
}
