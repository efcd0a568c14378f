pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{dim, error, header, load_report, phase, section, status, success, summary_row, warn};
pub use table::{
    categories_table, equipment_table, flight_control_table, organization_stats_table,
    organizations_table, sensors_table, stats_table, technologies_table, type_distribution_table,
    TableBuilder,
};
pub use theme::{theme, Theme};
