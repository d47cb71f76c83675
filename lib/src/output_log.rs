use crate::{config::SimulationConfig, error::SimulationError, report::SimulationReport};
use chrono::Utc;
use log::info;
use serde_derive::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

#[derive(Serialize, Deserialize)]
struct ResultInfo {
    schedule_length: i32,
    average_waiting_time: f32,
    average_turnaround_time: f32,
}

#[derive(Serialize, Deserialize)]
struct ConfigInfo {
    config: SimulationConfig,
}

/// Creates `<folder_path>/<file_name>.yaml`, making the folder if needed, and
/// returns its path.
pub fn create_yaml_file(folder_path: &str, file_name: &str) -> Result<String, SimulationError> {
    let folder = Path::new(folder_path);
    if !folder.is_dir() {
        fs::create_dir_all(folder)?;
        info!("Created folder: {}", folder_path);
    }
    let file_path = folder.join(format!("{}.yaml", file_name));
    fs::File::create(&file_path)?;
    Ok(file_path.to_string_lossy().into_owned())
}

pub fn create_scheduler_log_yaml_file(
    folder_path: &str,
    alg_name: &str,
) -> Result<String, SimulationError> {
    let date = Utc::now().format("%Y-%m-%d-%H-%M-%S");
    create_yaml_file(folder_path, &format!("{}-{}-log", date, alg_name))
}

pub fn append_info_to_yaml(file_path: &str, info: &str) -> Result<(), SimulationError> {
    let mut file = OpenOptions::new().append(true).create(true).open(file_path)?;
    file.write_all(info.as_bytes())?;
    Ok(())
}

pub fn dump_config_to_yaml(
    file_path: &str,
    config: &SimulationConfig,
) -> Result<(), SimulationError> {
    let yaml = serde_yaml::to_string(&ConfigInfo {
        config: config.clone(),
    })?;
    append_info_to_yaml(file_path, &yaml)
}

pub fn dump_result_info_to_yaml(
    file_path: &str,
    report: &SimulationReport,
) -> Result<(), SimulationError> {
    let result_info = ResultInfo {
        schedule_length: report.schedule_length(),
        average_waiting_time: report.average_waiting_time(),
        average_turnaround_time: report.average_turnaround_time(),
    };
    let yaml = serde_yaml::to_string(&result_info)?;
    append_info_to_yaml(file_path, &yaml)
}

/// Appends the per-process records, per-core totals and the scheduling chart.
pub fn dump_report_to_yaml(
    file_path: &str,
    report: &SimulationReport,
) -> Result<(), SimulationError> {
    let yaml = serde_yaml::to_string(report)?;
    append_info_to_yaml(file_path, &yaml)
}

pub fn dump_simulation_log_to_yaml(
    folder_path: &str,
    config: &SimulationConfig,
    report: &SimulationReport,
) -> Result<String, SimulationError> {
    let file_path = create_scheduler_log_yaml_file(folder_path, "round-robin")?;
    dump_config_to_yaml(&file_path, config)?;
    dump_result_info_to_yaml(&file_path, report)?;
    dump_report_to_yaml(&file_path, report)?;
    info!("Simulation log written to {}", file_path);
    Ok(file_path)
}
