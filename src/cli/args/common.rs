//! Common argument enums

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty format - human-optimized rich formatting
    #[default]
    Pretty,
    /// Table format - one row per field
    Table,
    /// JSON format - structured for scripts/APIs
    Json,
}

impl OutputFormat {
    /// Parse the `preferences.format` value from the config file
    pub fn from_preference(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "table" => Some(Self::Table),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Vehicle data group selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DataGroup {
    /// Position, speed and heading
    Drive,
    /// Battery and charging
    Charge,
    /// Cabin temperatures and HVAC
    Climate,
    /// Locks, doors, odometer, software version
    State,
    /// Display units and preferences
    Gui,
    /// Model, trim and hardware options
    Config,
    /// Everything in one request
    All,
}

impl DataGroup {
    pub fn label(&self) -> &'static str {
        match self {
            DataGroup::Drive => "drive_state",
            DataGroup::Charge => "charge_state",
            DataGroup::Climate => "climate_state",
            DataGroup::State => "vehicle_state",
            DataGroup::Gui => "gui_settings",
            DataGroup::Config => "vehicle_config",
            DataGroup::All => "vehicle_data",
        }
    }
}
