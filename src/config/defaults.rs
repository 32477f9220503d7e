use super::*;

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.octopus.energy/v1".to_string(),
            region: "C".to_string(),
            agile_product: "AGILE-24-10-01".to_string(),
            gas_product: "SILVER-25-09-02".to_string(),
            request_timeout_secs: 10,
            max_retries: 3,
            retry_delay_ms: 1000,
            max_pages: 4,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: ".".to_string(),
            file_prefix: "price-data-".to_string(),
        }
    }
}

impl Default for ChartRegionConfig {
    fn default() -> Self {
        // Below the 50px price boxes, above the hour labels
        Self {
            left: 30,
            right: 315,
            top: 90,
            height: 130,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            sink: SinkKind::File,
            output_dir: ".".to_string(),
            panel_device: "/dev/fb1".to_string(),
            chart: ChartRegionConfig::default(),
        }
    }
}

impl Default for PriceThresholds {
    fn default() -> Self {
        Self {
            cheap: 10.0,
            normal: 20.0,
            expensive: 35.0,
        }
    }
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            background: [17, 24, 39],
            text: [255, 255, 255],
            box_label: [200, 200, 200],
            green: [34, 197, 94],
            blue: [59, 130, 246],
            yellow: [234, 179, 8],
            red: [239, 68, 68],
            orange: [251, 146, 60],
            gas_label: [255, 220, 200],
            gas_tomorrow: [200, 190, 180],
            tomorrow_background: [30, 40, 60],
            gridline: [100, 110, 130],
            axis_label: [150, 150, 160],
            chart_label: [230, 230, 240],
            marker: [220, 220, 220],
            alert: [96, 165, 250],
            thresholds: PriceThresholds::default(),
        }
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            style: "bold".to_string(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            fetch_interval_secs: 300,
            redraw_interval_secs: 30,
            error_backoff_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_level: None,
            file_level: None,
            file: "/tmp/octodash.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for HomeAssistantConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: String::new(),
            conditions: Vec::new(),
            logic: ConditionLogic::And,
            message_entity_id: None,
            timeout_secs: 5,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tariff: TariffConfig::default(),
            cache: CacheConfig::default(),
            display: DisplayConfig::default(),
            palette: PaletteConfig::default(),
            fonts: FontConfig::default(),
            schedule: ScheduleConfig::default(),
            reconcile: ReconcileConfig::default(),
            logging: LoggingConfig::default(),
            timezone: "Europe/London".to_string(),
            home_assistant: None,
        }
    }
}
