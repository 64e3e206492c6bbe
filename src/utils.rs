use once_cell::sync::Lazy;
use tokio::sync::mpsc::UnboundedSender;

/// The whole app runs on one thread; spawned requests interleave with the
/// controller at await points.
pub static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime")
});

pub fn spawn_async<F>(fut: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::spawn(fut);
}

/// Runs `fut` in the background and posts its output to the controller's
/// event channel.
pub fn run_async_to_main<T, Fut>(tx: &UnboundedSender<T>, fut: Fut)
where
    T: Send + 'static,
    Fut: std::future::Future<Output = T> + Send + 'static,
{
    let tx = tx.clone();
    spawn_async(async move {
        let res = fut.await;
        let _ = tx.send(res);
    });
}

pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}
