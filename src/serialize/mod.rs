//! Text re-emission. Only DBC is supported, matching the parser contract.

pub mod dbc;
