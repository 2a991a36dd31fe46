pub mod analytics_report;
pub mod csv_export;
pub mod importer;
