//! Binary entry point that glues the SQLite-backed domain model to the TUI.
//! Summarizing the bootstrapping pipeline here keeps the intent obvious when
//! revisiting the code: we bring up the database, make sure a login exists,
//! hydrate the initial app state, and drive the Ratatui event loop until the
//! user exits.
use repertoire_manager::{ensure_default_admin, ensure_schema, fetch_artist_names, run_app, App};

/// Initialize persistence, seed the first account if needed, and launch the
/// Ratatui event loop.
///
/// Returning a `Result` bubbles up fatal initialization problems (for example
/// the user removing the writable data directory) to the terminal instead of
/// crashing silently.
fn main() -> anyhow::Result<()> {
    let conn = ensure_schema()?;
    let seeded = ensure_default_admin(&conn)?;
    let artist_names = fetch_artist_names(&conn)?;

    let notice = seeded.map(|email| {
        format!("First run: sign in as {email} with password 'changeme' and change it.")
    });

    let mut app = App::new(conn, artist_names, notice)?;
    run_app(&mut app)
}
