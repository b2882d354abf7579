/// Read-through caching over an optional [`Cache`](crate::db::Cache).
///
/// Returns the cached value when present. Otherwise awaits `$block` (a future
/// yielding `AppResult<T>`), queues the value for storage with `$ttl` seconds
/// and returns it. With no cache configured the block is simply awaited.
///
/// # Example
/// ```rust,ignore
/// let vector: Vec<f32> = cached!(self.cache.as_ref(), key, 86_400, async {
///     self.provider.embed(&inputs).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        match $cache {
            Some(cache) => {
                if let Some(hit) = cache.lookup(&$key).await {
                    Ok(hit)
                } else {
                    match $block.await {
                        Ok(value) => {
                            cache.set_in_background(&$key, &value, $ttl);
                            Ok(value)
                        }
                        Err(e) => Err(e),
                    }
                }
            }
            None => $block.await,
        }
    }};
}
