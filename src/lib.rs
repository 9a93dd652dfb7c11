//! River fishing conditions service.
//!
//! Pulls live discharge and water temperature from USGS and NWRFC, merges
//! them into one record per river, and classifies the current flow. The
//! weather, fly-shop report, and advice modules round out the response.

pub mod advice;
pub mod aggregate;
pub mod alert;
pub mod analysis;
pub mod conditions;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod report;
pub mod stations;
pub mod verify;
pub mod weather;
