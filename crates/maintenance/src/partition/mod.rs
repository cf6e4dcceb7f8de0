//! Partition-layout compiler.
//!
//! Turns a target disk and a declarative layout into `sgdisk`/`mkfs`
//! commands: wipe, fresh GPT, then for each entry create, type, label and
//! format the partition, and finally print the resulting table.
//!
//! The whole layout is validated before any command is built, so a bad
//! entry anywhere yields an error and no plan.

mod guid;
mod layout;

pub use guid::resolve as resolve_type_guid;
pub use layout::{Filesystem, LayoutEntry, MAX_LABEL_LEN, PartitionEnd, partition_device};

use crate::command::{self, Command, Plan};
use crate::error::{Error, Result};

const PLANNER: &str = "partition";

/// A layout entry that passed validation.
#[derive(Debug)]
struct Partition {
    number: usize,
    end: PartitionEnd,
    type_guid: String,
    label: Option<String>,
    filesystem: Option<Filesystem>,
}

/// Compile a JSON-encoded layout for `disk` into a plan.
pub fn plan(disk: &str, layout_json: &[u8]) -> Result<Plan> {
    if disk.is_empty() {
        return Err(Error::missing(PLANNER, "disk"));
    }
    // `null` decodes to an empty layout rather than a decode error
    let entries: Option<Vec<LayoutEntry>> = serde_json::from_slice(layout_json)?;
    plan_entries(disk, &entries.unwrap_or_default())
}

/// Compile an already-decoded layout for `disk` into a plan.
pub fn plan_entries(disk: &str, entries: &[LayoutEntry]) -> Result<Plan> {
    if disk.is_empty() {
        return Err(Error::missing(PLANNER, "disk"));
    }
    if entries.is_empty() {
        return Err(Error::EmptyLayout);
    }

    let partitions = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| validate(idx + 1, entry))
        .collect::<Result<Vec<_>>>()?;

    let mut cmds = vec![
        Command::new("sgdisk", ["--zap-all", disk], "wipe existing partition table"),
        Command::new("sgdisk", ["-o", disk], "initialize new GPT"),
    ];

    for part in &partitions {
        let n = part.number;
        cmds.push(Command::new(
            "sgdisk",
            [
                "-n".to_string(),
                format!("{n}:0:{}", part.end.sgdisk_end()),
                disk.to_string(),
            ],
            format!("create partition {n}"),
        ));
        cmds.push(Command::new(
            "sgdisk",
            ["-t".to_string(), format!("{n}:{}", part.type_guid), disk.to_string()],
            format!("set partition {n} type"),
        ));
        if let Some(label) = &part.label {
            cmds.push(Command::new(
                "sgdisk",
                ["-c".to_string(), format!("{n}:{label}"), disk.to_string()],
                format!("label partition {n}"),
            ));
        }
        if let Some(fs) = part.filesystem {
            let device = partition_device(disk, n);
            cmds.extend(fs.format_command(part.label.as_deref(), &device));
        }
    }

    cmds.push(Command::new(
        "sgdisk",
        ["-p", disk],
        "print resulting partition table",
    ));

    log::debug!(
        "partition plan for {disk}: {} partitions, {} commands",
        partitions.len(),
        cmds.len()
    );
    command::trace_plan(PLANNER, &cmds);
    Ok(cmds)
}

fn validate(index: usize, entry: &LayoutEntry) -> Result<Partition> {
    if entry.size.trim().is_empty() {
        return Err(Error::MissingEntryField {
            index,
            field: "size",
        });
    }
    let end = PartitionEnd::from_token(&entry.size).ok_or_else(|| Error::EntryConstraint {
        index,
        message: "size token is empty".to_string(),
    })?;

    if entry.type_guid.trim().is_empty() {
        return Err(Error::MissingEntryField {
            index,
            field: "type_guid",
        });
    }

    let label = if entry.label.is_empty() {
        None
    } else {
        validate_label(index, &entry.label)?;
        Some(entry.label.clone())
    };

    let filesystem = if entry.format.is_empty() {
        None
    } else {
        let fs = Filesystem::from_token(&entry.format).ok_or_else(|| Error::UnsupportedFormat {
            index,
            format: entry.format.clone(),
        })?;
        Some(fs).filter(|fs| *fs != Filesystem::Raw)
    };

    let type_guid = resolve_type_guid(&entry.type_guid).ok_or_else(|| Error::UnknownTypeGuid {
        index,
        value: entry.type_guid.clone(),
    })?;

    Ok(Partition {
        number: index,
        end,
        type_guid,
        label,
        filesystem,
    })
}

fn validate_label(index: usize, label: &str) -> Result<()> {
    if label.encode_utf16().count() > MAX_LABEL_LEN {
        return Err(Error::EntryConstraint {
            index,
            message: format!("label exceeds {MAX_LABEL_LEN} characters"),
        });
    }
    // sgdisk uses ':' to separate the partition number from the name
    if label.contains(':') {
        return Err(Error::EntryConstraint {
            index,
            message: "label may not contain colon characters".to_string(),
        });
    }
    Ok(())
}
