use std::fs;
use std::io::ErrorKind;
use std::os::unix::net::UnixStream as StdUnixStream;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};

use folio_core::config::{self, folio_root, FolioConfig, SeedPolicy};
use folio_core::types::{ContentKind, HomePageContent, WhyChooseUsContent};
use folio_renderer::PageCache;
use folio_sync::{form, ContentSync, Site, SyncError};

use crate::error::{io_err, DaemonError};
use crate::paths::socket_path;
use crate::protocol::{DaemonRequest, DaemonResponse};

const LOG_FORMAT_ENV: &str = "FOLIO_LOG_FORMAT";

/// Content writes, applied one at a time by the writer task.
#[derive(Debug, Clone)]
enum WriteOp {
    Seed(Option<ContentKind>),
    Replace { kind: ContentKind, items: Value },
    HomeUpdate(Value),
    WhyUpdate(Value),
}

impl WriteOp {
    fn label(&self) -> String {
        match self {
            WriteOp::Seed(Some(kind)) => format!("seed {kind}"),
            WriteOp::Seed(None) => "seed all".to_string(),
            WriteOp::Replace { kind, .. } => format!("replace {kind}"),
            WriteOp::HomeUpdate(_) => "home update".to_string(),
            WriteOp::WhyUpdate(_) => "why-choose-us update".to_string(),
        }
    }

    /// Under [`SeedPolicy::OnEmptyRead`] a replace that leaves the collection
    /// empty reseeds it in the same job, which is where a load would have.
    fn apply(self, sync: &ContentSync, policy: SeedPolicy) -> Result<Value, SyncError> {
        match self {
            WriteOp::Seed(Some(kind)) => Ok(json!({ "kind": kind, "seeded": form::seed(sync, kind)? })),
            WriteOp::Seed(None) => Ok(json!({ "seeded": sync.seed_all()? })),
            WriteOp::Replace { kind, items } => {
                let outcome = form::replace(sync, kind, items)?;
                if outcome.inserted == 0 && policy == SeedPolicy::OnEmptyRead {
                    form::seed(sync, kind)?;
                }
                Ok(json!(outcome))
            }
            WriteOp::HomeUpdate(patch) => {
                form::update_home(sync, patch)?;
                Ok(json!({ "updated": "home" }))
            }
            WriteOp::WhyUpdate(patch) => {
                form::update_why_choose_us(sync, patch)?;
                Ok(json!({ "updated": "why-choose-us" }))
            }
        }
    }
}

struct WriteJob {
    op: WriteOp,
    respond_to: oneshot::Sender<Result<Value, String>>,
}

/// Write counters reported by `status`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WriteStats {
    pub writes: u64,
    pub failed_writes: u64,
    pub last_write_at_unix: u64,
}

/// Everything request handlers share.
#[derive(Clone)]
struct Shared {
    home: PathBuf,
    config: FolioConfig,
    sync: Arc<ContentSync>,
    site: Arc<Site>,
    stats: Arc<RwLock<WriteStats>>,
    started_at_unix: u64,
}

/// Start the daemon runtime and block the current thread until it exits.
pub fn start_blocking(home: &Path) -> Result<(), DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(home.to_path_buf()))
}

/// Run the daemon runtime.
pub async fn run(home: PathBuf) -> Result<(), DaemonError> {
    let config = config::load_at(&home)?;
    ensure_runtime_dirs(&home)?;

    // Reads run concurrently with the writer, so they never seed. Defaults
    // are written here and by the writer task instead.
    let cache = Arc::new(PageCache::new());
    let sync = Arc::new(
        ContentSync::open(&home, &config, cache.clone()).with_seed_policy(SeedPolicy::Explicit),
    );
    let site = Arc::new(Site::new(sync.clone(), cache, &config)?);
    tracing::info!(
        store = %config.store_dir_at(&home).display(),
        seed_policy = ?config.seed_policy,
        "content store opened",
    );
    if config.seed_policy == SeedPolicy::OnEmptyRead {
        seed_on_start(&sync).await;
    }

    let shared = Shared {
        home: home.clone(),
        config,
        sync,
        site,
        stats: Arc::new(RwLock::new(WriteStats::default())),
        started_at_unix: unix_seconds_now(),
    };

    let (write_tx, write_rx) = mpsc::channel::<WriteJob>(64);
    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    let writer_handle = {
        let shutdown = shutdown_tx.clone();
        let shared = shared.clone();
        tokio::spawn(async move {
            let result = writer_task(shared, write_rx, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let socket_handle = {
        let shutdown = shutdown_tx.clone();
        let shared = shared.clone();
        tokio::spawn(async move {
            let result =
                socket_server_task(shared, write_tx, shutdown.clone(), shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, shutting down daemon");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => Err(DaemonError::Protocol(format!("ctrl-c handler failed: {err}"))),
                    }
                }
            }
        })
    };

    let (writer_result, socket_result, signal_result) =
        tokio::join!(writer_handle, socket_handle, signal_handle);

    handle_join("writer", writer_result)?;
    handle_join("socket_server", socket_result)?;
    handle_join("signal_handler", signal_result)?;
    Ok(())
}

async fn writer_task(
    shared: Shared,
    mut write_rx: mpsc::Receiver<WriteJob>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            maybe_job = write_rx.recv() => {
                let Some(job) = maybe_job else { break };
                let started = Instant::now();
                let label = job.op.label();
                let op = job.op;
                let sync = shared.sync.clone();
                let policy = shared.config.seed_policy;
                let result = tokio::task::spawn_blocking(move || op.apply(&sync, policy))
                    .await
                    .map_err(|err| DaemonError::Protocol(format!("write task join error: {err}")))?;

                let mut stats = shared.stats.write().await;
                let outcome = match result {
                    Ok(data) => {
                        stats.writes += 1;
                        stats.last_write_at_unix = unix_seconds_now();
                        tracing::info!(
                            op = %label,
                            duration_ms = started.elapsed().as_millis() as u64,
                            "write committed",
                        );
                        Ok(data)
                    }
                    Err(err) => {
                        stats.failed_writes += 1;
                        tracing::error!(op = %label, error = %err, "write failed");
                        Err(err.to_string())
                    }
                };
                drop(stats);

                let _ = job.respond_to.send(outcome);
            }
        }
    }

    Ok(())
}

/// Seed whatever is empty before the socket opens. Failures are logged; the
/// daemon still serves whatever the store holds.
async fn seed_on_start(sync: &Arc<ContentSync>) {
    let sync = sync.clone();
    match tokio::task::spawn_blocking(move || sync.seed_all()).await {
        Ok(Ok(seeded)) if seeded.is_empty() => {}
        Ok(Ok(seeded)) => tracing::info!(collections = ?seeded, "seeded empty collections"),
        Ok(Err(err)) => tracing::warn!(error = %err, "startup seeding failed"),
        Err(err) => tracing::warn!(error = %err, "startup seeding task failed"),
    }
}

async fn socket_server_task(
    shared: Shared,
    write_tx: mpsc::Sender<WriteJob>,
    shutdown_tx: broadcast::Sender<()>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let socket = socket_path(&shared.home);
    prepare_socket_for_bind(&socket)?;

    let listener = UnixListener::bind(&socket).map_err(|e| io_err(&socket, e))?;
    set_socket_permissions(&socket)?;
    tracing::info!(socket = %socket.display(), "daemon listening");

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            accepted = listener.accept() => {
                let (stream, _) = accepted.map_err(|e| io_err(&socket, e))?;
                let shared = shared.clone();
                let write_tx = write_tx.clone();
                let shutdown_tx = shutdown_tx.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_socket_client(stream, shared, write_tx, shutdown_tx).await {
                        tracing::error!(error = %err, "socket client error");
                    }
                });
            }
        }
    }

    if socket.exists() {
        let _ = fs::remove_file(&socket);
    }
    Ok(())
}

async fn handle_socket_client(
    stream: UnixStream,
    shared: Shared,
    write_tx: mpsc::Sender<WriteJob>,
    shutdown_tx: broadcast::Sender<()>,
) -> Result<(), DaemonError> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| io_err("daemon socket read", e))?
    {
        if line.trim().is_empty() {
            continue;
        }

        let request = match serde_json::from_str::<DaemonRequest>(&line) {
            Ok(request) => request,
            Err(err) => {
                write_response(
                    &mut writer,
                    &DaemonResponse::error(format!("invalid request JSON: {err}")),
                )
                .await?;
                continue;
            }
        };

        let stop = request.cmd == "stop";
        let response = if stop {
            let _ = shutdown_tx.send(());
            DaemonResponse::ok(json!({ "stopping": true }))
        } else {
            dispatch(&shared, &write_tx, request).await
        };

        write_response(&mut writer, &response).await?;
        if stop {
            break;
        }
    }

    Ok(())
}

async fn dispatch(
    shared: &Shared,
    write_tx: &mpsc::Sender<WriteJob>,
    request: DaemonRequest,
) -> DaemonResponse {
    let result = match request.cmd.as_str() {
        "status" => Ok(build_status_payload(shared).await),
        "load" => match request.kind {
            Some(kind) => read(shared, move |sync, _| form::load(sync, kind)).await,
            None => Err(missing("load", "kind")),
        },
        "seed" => enqueue_write(write_tx, WriteOp::Seed(request.kind)).await,
        "replace" => match (request.kind, request.items) {
            (Some(kind), Some(items)) if request.dry_run => {
                read(shared, move |sync, _| Ok(json!(form::preview(sync, kind, items)?))).await
            }
            (Some(kind), Some(items)) => enqueue_write(write_tx, WriteOp::Replace { kind, items }).await,
            (None, _) => Err(missing("replace", "kind")),
            (_, None) => Err(missing("replace", "items")),
        },
        "home" => {
            read(shared, |sync, _| {
                Ok(json!(sync.try_load_singleton::<HomePageContent>()?))
            })
            .await
        }
        "home_update" => match request.patch {
            Some(patch) => enqueue_write(write_tx, WriteOp::HomeUpdate(patch)).await,
            None => Err(missing("home_update", "patch")),
        },
        "why" => {
            read(shared, |sync, _| {
                Ok(json!(sync.try_load_singleton::<WhyChooseUsContent>()?))
            })
            .await
        }
        "why_update" => match request.patch {
            Some(patch) => enqueue_write(write_tx, WriteOp::WhyUpdate(patch)).await,
            None => Err(missing("why_update", "patch")),
        },
        "page" => {
            let route = request.route.unwrap_or_else(|| "/".to_string());
            read(shared, move |_, site| Ok(json!(site.page(&route)?))).await
        }
        other => Err(DaemonError::Protocol(format!("unknown command '{other}'"))),
    };

    match result {
        Ok(data) => DaemonResponse::ok(data),
        Err(err) => DaemonResponse::error(err.to_string()),
    }
}

fn missing(cmd: &str, field: &str) -> DaemonError {
    DaemonError::Protocol(format!("'{cmd}' requires '{field}'"))
}

/// Run a read on the blocking pool. Reads bypass the writer queue.
async fn read<F>(shared: &Shared, f: F) -> Result<Value, DaemonError>
where
    F: FnOnce(&ContentSync, &Site) -> Result<Value, SyncError> + Send + 'static,
{
    let sync = shared.sync.clone();
    let site = shared.site.clone();
    let result = tokio::task::spawn_blocking(move || f(&sync, &site))
        .await
        .map_err(|err| DaemonError::Protocol(format!("read task join error: {err}")))?;
    Ok(result?)
}

async fn enqueue_write(write_tx: &mpsc::Sender<WriteJob>, op: WriteOp) -> Result<Value, DaemonError> {
    let (tx, rx) = oneshot::channel();
    write_tx
        .send(WriteJob { op, respond_to: tx })
        .await
        .map_err(|_| DaemonError::ChannelClosed("write queue"))?;

    let outcome = rx
        .await
        .map_err(|_| DaemonError::ChannelClosed("write response"))?;
    outcome.map_err(DaemonError::Protocol)
}

async fn build_status_payload(shared: &Shared) -> Value {
    let stats = shared.stats.read().await.clone();
    json!({
        "running": true,
        "pid": std::process::id(),
        "started_at_unix": shared.started_at_unix,
        "site_name": shared.config.site_name,
        "seed_policy": shared.config.seed_policy,
        "store": shared.config.store_dir_at(&shared.home).display().to_string(),
        "socket": socket_path(&shared.home).display().to_string(),
        "cached_routes": shared.site.cache().routes(),
        "writes": stats.writes,
        "failed_writes": stats.failed_writes,
        "last_write_at_unix": stats.last_write_at_unix,
    })
}

fn prepare_socket_for_bind(socket: &Path) -> Result<(), DaemonError> {
    if !socket.exists() {
        return Ok(());
    }

    match StdUnixStream::connect(socket) {
        Ok(_) => {
            return Err(DaemonError::Protocol(format!(
                "daemon socket already in use: {}",
                socket.display()
            )));
        }
        Err(err) => {
            tracing::warn!(
                socket = %socket.display(),
                error = %err,
                "removing stale daemon socket before bind",
            );
        }
    }

    match fs::remove_file(socket) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_err(socket, err)),
    }
}

fn ensure_runtime_dirs(home: &Path) -> Result<(), DaemonError> {
    let root = folio_root(home);
    if !root.exists() {
        fs::create_dir_all(&root).map_err(|e| io_err(&root, e))?;
    }
    Ok(())
}

async fn write_response(
    writer: &mut OwnedWriteHalf,
    response: &DaemonResponse,
) -> Result<(), DaemonError> {
    let payload = serde_json::to_string(response)?;
    writer
        .write_all(payload.as_bytes())
        .await
        .map_err(|e| io_err("daemon socket write", e))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| io_err("daemon socket write", e))?;
    writer
        .flush()
        .await
        .map_err(|e| io_err("daemon socket flush", e))?;
    Ok(())
}

fn handle_join(
    task: &str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Protocol(format!(
            "{task} task join failure: {err}"
        ))),
    }
}

fn unix_seconds_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Logs to stderr; `RUST_LOG` overrides the `info` default and
/// `FOLIO_LOG_FORMAT=json` switches to one JSON object per line. Records from
/// the library crates' `log` macros are forwarded into the subscriber.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let _ = if json {
        fmt().json().with_env_filter(filter).try_init()
    } else {
        fmt().with_env_filter(filter).with_target(false).try_init()
    };
}

#[cfg(unix)]
fn set_socket_permissions(path: &Path) -> Result<(), DaemonError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_socket_permissions(_path: &Path) -> Result<(), DaemonError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::store::MemoryStore;
    use folio_renderer::Invalidator;
    use tempfile::TempDir;

    fn shared(home: &Path) -> Shared {
        let config = FolioConfig::default();
        let cache = Arc::new(PageCache::new());
        let sync = Arc::new(
            ContentSync::new(Arc::new(MemoryStore::new()), cache.clone())
                .with_seed_policy(SeedPolicy::Explicit),
        );
        let site = Arc::new(Site::new(sync.clone(), cache, &config).expect("site"));
        Shared {
            home: home.to_path_buf(),
            config,
            sync,
            site,
            stats: Arc::new(RwLock::new(WriteStats::default())),
            started_at_unix: 1_000_000,
        }
    }

    fn spawn_writer(shared: &Shared) -> (mpsc::Sender<WriteJob>, broadcast::Sender<()>) {
        let (write_tx, write_rx) = mpsc::channel(8);
        let (shutdown_tx, _) = broadcast::channel(1);
        tokio::spawn(writer_task(shared.clone(), write_rx, shutdown_tx.subscribe()));
        (write_tx, shutdown_tx)
    }

    #[tokio::test]
    async fn status_payload_before_any_write() {
        let home = TempDir::new().expect("home");
        let payload = build_status_payload(&shared(home.path())).await;

        assert_eq!(payload["running"], json!(true));
        assert_eq!(payload["started_at_unix"], json!(1_000_000u64));
        assert_eq!(payload["writes"], json!(0u64));
        assert_eq!(payload["seed_policy"], json!("on_empty_read"));
        assert_eq!(payload["cached_routes"], json!([]));
    }

    #[tokio::test]
    async fn replace_goes_through_writer_and_counts() {
        let home = TempDir::new().expect("home");
        let shared = shared(home.path());
        let (write_tx, _shutdown) = spawn_writer(&shared);

        let mut request = DaemonRequest::new("replace");
        request.kind = Some(ContentKind::Pricing);
        request.items = Some(json!([{ "title": "Solo", "price": "₹1999", "description": "One page" }]));
        let response = dispatch(&shared, &write_tx, request).await;
        assert!(response.ok, "{:?}", response.error);
        assert_eq!(response.data.unwrap()["inserted"], json!(1));

        let stats = shared.stats.read().await.clone();
        assert_eq!(stats.writes, 1);
        assert!(stats.last_write_at_unix > 0);
    }

    #[tokio::test]
    async fn reads_never_seed_and_startup_does() {
        let home = TempDir::new().expect("home");
        let shared = shared(home.path());
        let (write_tx, _shutdown) = spawn_writer(&shared);

        let mut load = DaemonRequest::new("load");
        load.kind = Some(ContentKind::Pricing);
        let response = dispatch(&shared, &write_tx, load.clone()).await;
        assert_eq!(response.data.unwrap(), json!([]));

        seed_on_start(&shared.sync).await;
        let response = dispatch(&shared, &write_tx, load).await;
        assert_eq!(response.data.unwrap().as_array().map(Vec::len), Some(2));
        assert_eq!(shared.stats.read().await.writes, 0);
    }

    #[tokio::test]
    async fn empty_replace_reseeds_inside_the_writer() {
        let home = TempDir::new().expect("home");
        let shared = shared(home.path());
        let (write_tx, _shutdown) = spawn_writer(&shared);

        let mut request = DaemonRequest::new("replace");
        request.kind = Some(ContentKind::Services);
        request.items = Some(json!([]));
        let response = dispatch(&shared, &write_tx, request).await;
        assert!(response.ok, "{:?}", response.error);
        assert_eq!(response.data.unwrap()["inserted"], json!(0));

        let mut load = DaemonRequest::new("load");
        load.kind = Some(ContentKind::Services);
        let loaded = dispatch(&shared, &write_tx, load).await.data.unwrap();
        assert_eq!(loaded[0]["title"], json!("Business Websites"));
        assert_eq!(loaded.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn invalid_replace_is_reported_and_counted_as_failed() {
        let home = TempDir::new().expect("home");
        let shared = shared(home.path());
        let (write_tx, _shutdown) = spawn_writer(&shared);

        let mut request = DaemonRequest::new("replace");
        request.kind = Some(ContentKind::Portfolio);
        request.items = Some(json!([{ "title": "", "category": "Web App" }]));
        let response = dispatch(&shared, &write_tx, request).await;
        assert!(!response.ok);
        assert!(response.error.unwrap().contains("items[0].title"));
        assert_eq!(shared.stats.read().await.failed_writes, 1);
    }

    #[tokio::test]
    async fn dry_run_replace_writes_nothing() {
        let home = TempDir::new().expect("home");
        let shared = shared(home.path());
        let (write_tx, _shutdown) = spawn_writer(&shared);

        let mut request = DaemonRequest::new("replace");
        request.kind = Some(ContentKind::Services);
        request.items = Some(json!([]));
        request.dry_run = true;
        let response = dispatch(&shared, &write_tx, request).await;
        assert!(response.ok);
        assert_eq!(response.data.unwrap()["proposed"], json!(0));
        assert_eq!(shared.stats.read().await.writes, 0);
    }

    #[tokio::test]
    async fn page_request_fills_the_cache() {
        let home = TempDir::new().expect("home");
        let shared = shared(home.path());
        let (write_tx, _shutdown) = spawn_writer(&shared);

        let mut request = DaemonRequest::new("page");
        request.route = Some("/pricing".to_string());
        let response = dispatch(&shared, &write_tx, request).await;
        assert!(response.ok);
        let data = response.data.unwrap();
        assert_eq!(data["route"], json!("/pricing"));
        assert_eq!(data["etag"].as_str().map(str::len), Some(64));
        assert_eq!(shared.site.cache().routes(), vec!["/pricing".to_string()]);

        shared.site.cache().invalidate("/pricing");
        assert!(shared.site.cache().is_empty());
    }

    #[tokio::test]
    async fn missing_fields_and_unknown_commands_are_errors() {
        let home = TempDir::new().expect("home");
        let shared = shared(home.path());
        let (write_tx, _shutdown) = spawn_writer(&shared);

        let response = dispatch(&shared, &write_tx, DaemonRequest::new("load")).await;
        assert_eq!(response.error.as_deref(), Some("daemon protocol error: 'load' requires 'kind'"));

        let response = dispatch(&shared, &write_tx, DaemonRequest::new("sync")).await;
        assert!(response.error.unwrap().contains("unknown command 'sync'"));
    }
}
