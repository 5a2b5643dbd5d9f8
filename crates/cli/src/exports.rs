use dragnet_watch::TransformerExports;

/// The transformer wiring seam.
///
/// Deployments link their decoder crates here by pushing initializers onto
/// the returned exports; the stock binary ships with none, and subcommands
/// skip any watcher whose transformer set is empty.
pub fn exports() -> TransformerExports {
    TransformerExports::default()
}
