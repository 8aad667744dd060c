use super::{common::vec3d::Vec3D, flight_phase::FlightPhase, telemetry::TelemetryEvent};
use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

const HEADER: &str = "timestamp,kind,phase,values";

/// Text recording of every telemetry event seen during a mission run.
///
/// Acquired with [`NavLog::start_log`] and released with [`NavLog::stop_log`];
/// dropping the log flushes it as well, so a panicking mission still leaves a
/// complete file behind.
#[derive(Debug)]
pub struct NavLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl NavLog {
    /// Creates `dir` if needed and truncates `dir/filename`.
    ///
    /// # Errors
    /// Any I/O error while creating the directory, file or header.
    pub fn start_log<P: AsRef<Path>>(dir: P, filename: &str) -> io::Result<Self> {
        fs::create_dir_all(dir.as_ref())?;
        let path = dir.as_ref().join(filename);
        let mut writer = BufWriter::new(File::create(&path)?);
        writeln!(writer, "{HEADER}")?;
        Ok(Self { path, writer })
    }

    /// Appends one line for `event`, observed while in `phase`.
    ///
    /// # Errors
    /// Any I/O error from the underlying writer.
    pub fn record(&mut self, event: &TelemetryEvent, phase: FlightPhase) -> io::Result<()> {
        let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3f");
        let values = match event {
            TelemetryEvent::LocalPosition(pos) => columns(pos),
            TelemetryEvent::LocalVelocity(vel) => columns(vel),
            TelemetryEvent::VehicleState { armed, guided, global_position, global_home } => {
                format!(
                    "armed={armed} guided={guided} global={} home={}",
                    columns(global_position),
                    columns(global_home)
                )
            }
        };
        writeln!(self.writer, "{ts},{event},{phase},{values}")?;
        Ok(())
    }

    /// Flushes and closes the log.
    ///
    /// # Errors
    /// Any I/O error while flushing.
    pub fn stop_log(mut self) -> io::Result<PathBuf> {
        self.writer.flush()?;
        Ok(self.path.clone())
    }
}

fn columns(v: &Vec3D<f64>) -> String { format!("{}:{}:{}", v.x(), v.y(), v.z()) }

impl Drop for NavLog {
    fn drop(&mut self) { let _ = self.writer.flush(); }
}
