//! egui rendering: the page body and toolbar (`panels`) and the charts
//! (`plot`). Nothing here computes statistics; it draws a `DashboardView`.

pub mod panels;
pub mod plot;
