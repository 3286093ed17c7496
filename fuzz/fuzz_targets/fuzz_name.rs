#![no_main]
use std::error::Error;

use libfuzzer_sys::fuzz_target;
use sfnt_read::{
    tables::name::{best_name, Name},
    types::NameId,
    CancelToken, OffsetTable, SliceSource, Validation,
};

fn do_name_things(data: &[u8]) -> Result<(), Box<dyn Error>> {
    let mut source = SliceSource::new(data);
    let cancel = CancelToken::new();
    let directory = OffsetTable::read(&mut source, 0)?;
    let table = directory.name().ok_or("no name table")?;
    let name = Name::read(&mut source, table, &cancel)?;
    let decoded = name.entries(&mut source, Validation::Strict, &cancel)?;
    for entry in &decoded.entries {
        let _ = entry.text.to_string();
    }
    let _ = best_name(&decoded.entries, NameId::FAMILY_NAME);
    Ok(())
}

fuzz_target!(|data: &[u8]| {
    let _ = do_name_things(data);
});
