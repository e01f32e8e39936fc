use std::io::{self, Write};
use std::path::Path;

use crate::sim::Telemetry;

/// Write telemetry rows in CSV format.
///
/// Columns: tick, time, pos_x, pos_y, pos_z, speed, true_speed,
///          world_forward, world_right, world_up,
///          local_forward, local_right, local_up,
///          pitch_deg, roll_deg, in_gravity, mode, dampeners, gyro_override,
///          rate_pitch, rate_yaw, rate_roll
pub fn write_telemetry<W: Write>(writer: &mut W, telemetry: &[Telemetry]) -> io::Result<()> {
    writeln!(
        writer,
        "tick,time,pos_x,pos_y,pos_z,speed,true_speed,\
         world_forward,world_right,world_up,\
         local_forward,local_right,local_up,\
         pitch_deg,roll_deg,in_gravity,mode,dampeners,gyro_override,\
         rate_pitch,rate_yaw,rate_roll"
    )?;

    for t in telemetry {
        writeln!(
            writer,
            "{},{:.4},{:.3},{:.3},{:.3},{:.4},{:.4},\
             {:.4},{:.4},{:.4},\
             {:.4},{:.4},{:.4},\
             {:.3},{:.3},{},{},{},{},\
             {:.5},{:.5},{:.5}",
            t.tick,
            t.time,
            t.position[0], t.position[1], t.position[2],
            t.speed,
            t.true_speed,
            t.world_forward, t.world_right, t.world_up,
            t.local_forward, t.local_right, t.local_up,
            t.pitch,
            t.roll,
            t.in_gravity as u8,
            t.mode,
            t.dampeners as u8,
            t.gyro_override as u8,
            t.rate_pitch, t.rate_yaw, t.rate_roll,
        )?;
    }

    Ok(())
}

/// Write telemetry to a CSV file at the given path.
pub fn write_telemetry_file(path: impl AsRef<Path>, telemetry: &[Telemetry]) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_telemetry(&mut file, telemetry)
}
