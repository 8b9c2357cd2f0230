//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `pms_core` linkage.
//! - Print the navigation a role would see, deterministically.
//!
//! Usage:
//! - `pms_cli` prints ping and version.
//! - `pms_cli nav ROLE [MENU_ID]` prints the landing dashboard, menu tree
//!   and optionally the resolved route.
//! - `pms_cli session` runs one liveness check against the configured DB.

use pms_core::auth::store::check_persisted_session;
use pms_core::db::{now_epoch_ms, open_db};
use pms_core::navigation::router::resolve_route_for;
use pms_core::{default_dashboard_for, AppConfig, MenuItem, Role};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("pms_core ping={}", pms_core::ping());
    println!("pms_core version={}", pms_core::core_version());

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => ExitCode::SUCCESS,
        Some("nav") => match args.get(1) {
            Some(role) => {
                print_navigation(role, args.get(2).map(String::as_str));
                ExitCode::SUCCESS
            }
            None => usage(),
        },
        Some("session") => match check_session() {
            Ok(status) => {
                println!("session={status}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("session check failed: {err}");
                ExitCode::FAILURE
            }
        },
        Some(_) => usage(),
    }
}

fn usage() -> ExitCode {
    eprintln!("usage: pms_cli [nav ROLE [MENU_ID] | session]");
    ExitCode::from(2)
}

fn print_navigation(raw_role: &str, menu_id: Option<&str>) {
    let role = Role::from_str_or_default(raw_role);
    println!("role={role}");
    println!("default_dashboard={}", default_dashboard_for(raw_role));
    for item in pms_core::menu_for_role(role) {
        print_item(&item, 0);
    }
    if let Some(menu_id) = menu_id {
        println!("route={}", resolve_route_for(menu_id, raw_role).key());
    }
}

fn print_item(item: &MenuItem, depth: usize) {
    println!("{}- {} ({})", "  ".repeat(depth), item.label, item.id.as_str());
    for child in &item.children {
        print_item(child, depth + 1);
    }
}

fn check_session() -> Result<String, String> {
    let config = AppConfig::from_env().map_err(|err| err.to_string())?;
    pms_core::init_logging_from_config(&config)?;
    let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let check = check_persisted_session(&conn, now_epoch_ms()).map_err(|err| err.to_string())?;
    Ok(check.as_str().to_string())
}
