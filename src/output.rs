use std::{io, path::Path};

use crate::{error::Result, model::Place};

pub const HEADER: [&str; 2] = ["Restaurant Name", "Address"];

/// Write the header and one `name,address` row per place.
pub fn write_csv<W: io::Write>(places: &[Place], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;
    for place in places {
        wtr.write_record([&place.name, &place.address])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Create or truncate `path` and write the places to it.
pub fn save_csv(places: &[Place], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(places, io::BufWriter::new(file))
}
