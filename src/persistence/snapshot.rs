use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::world::World;

const MAGIC: [u8; 4] = *b"HZF1";
const FILE_PREFIX: &str = "hazards-";
const FILE_SUFFIX: &str = ".bin";

/// Fixed-size summary written ahead of the world so a directory can be
/// listed without decoding every map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct SnapshotHeader {
    magic: [u8; 4],
    tick: u64,
    saved_at_ms: u64,
    width: u32,
    height: u32,
    active_tiles: u32,
    field_entries: u32,
    creatures: u32,
}

impl SnapshotHeader {
    fn describe(world: &World, saved_at_ms: u64) -> Self {
        let (active_tiles, field_entries) = world
            .tiles
            .iter()
            .filter(|t| !t.fields.is_empty())
            .fold((0u32, 0u32), |(tiles, entries), t| {
                (tiles + 1, entries + t.fields.len() as u32)
            });
        SnapshotHeader {
            magic: MAGIC,
            tick: world.tick_count,
            saved_at_ms,
            width: world.width,
            height: world.height,
            active_tiles,
            field_entries,
            creatures: world.living_creatures() as u32,
        }
    }

    fn matches(&self, world: &World) -> bool {
        self.width == world.width
            && self.height == world.height
            && self.tick == world.tick_count
            && world.tiles.len() == world.width as usize * world.height as usize
    }
}

/// What the header of a snapshot file says about the map inside it.
#[derive(Debug, Clone)]
pub struct SnapshotMetadata {
    pub path: PathBuf,
    pub tick_count: u64,
    pub saved_at_ms: u64,
    pub width: u32,
    pub height: u32,
    /// Tiles holding at least one field entry.
    pub active_tiles: u32,
    pub field_entries: u32,
    pub creatures: u32,
    pub file_size: u64,
}

#[derive(Debug)]
pub enum SnapshotError {
    Io(io::Error),
    Serialize(String),
    Deserialize(String),
    /// The header and the map disagree, or the header is not ours.
    Corrupt(PathBuf),
    NoValidSnapshots,
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::Io(e) => write!(f, "snapshot I/O failed: {}", e),
            SnapshotError::Serialize(e) => write!(f, "cannot encode map: {}", e),
            SnapshotError::Deserialize(e) => write!(f, "cannot decode map: {}", e),
            SnapshotError::Corrupt(path) => {
                write!(f, "{} does not hold a consistent map", path.display())
            }
            SnapshotError::NoValidSnapshots => write!(
                f,
                "no loadable hazard map found; create one with `hazardfield generate`"
            ),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<io::Error> for SnapshotError {
    fn from(e: io::Error) -> Self {
        SnapshotError::Io(e)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

fn file_name(tick: u64, saved_at_ms: u64) -> String {
    format!("{}t{}-{}{}", FILE_PREFIX, tick, saved_at_ms, FILE_SUFFIX)
}

fn is_snapshot_name(name: &str) -> bool {
    name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX)
}

fn is_temp_name(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(".tmp")
}

/// Encode `world` with its header and write it to `dir` under a name that
/// does not clash with an existing file.
fn write_snapshot(world: &World, dir: &Path, saved_at_ms: u64) -> Result<PathBuf, SnapshotError> {
    fs::create_dir_all(dir)?;

    let mut stamp = saved_at_ms;
    let mut target = dir.join(file_name(world.tick_count, stamp));
    while target.exists() {
        stamp += 1;
        target = dir.join(file_name(world.tick_count, stamp));
    }

    let header = SnapshotHeader::describe(world, stamp);
    let mut bytes = Vec::new();
    bincode::serialize_into(&mut bytes, &header)
        .and_then(|_| bincode::serialize_into(&mut bytes, world))
        .map_err(|e| SnapshotError::Serialize(e.to_string()))?;

    let name = target
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("snapshot");
    let tmp = dir.join(format!(".{}.tmp", name));
    let written = fs::write(&tmp, &bytes).and_then(|_| fs::rename(&tmp, &target));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(SnapshotError::Io(e));
    }
    Ok(target)
}

/// Save the map into `snapshot_dir`. The file appears atomically: readers see
/// either the complete snapshot or nothing.
pub fn save_snapshot(world: &World, snapshot_dir: &Path) -> Result<PathBuf, SnapshotError> {
    let path = write_snapshot(world, snapshot_dir, now_ms())?;
    debug!(path = %path.display(), tick = world.tick_count, "snapshot written");
    Ok(path)
}

fn read_header(path: &Path) -> Result<SnapshotHeader, SnapshotError> {
    let mut reader = BufReader::new(File::open(path)?);
    let header: SnapshotHeader = bincode::deserialize_from(&mut reader)
        .map_err(|e| SnapshotError::Deserialize(e.to_string()))?;
    if header.magic != MAGIC {
        return Err(SnapshotError::Corrupt(path.to_path_buf()));
    }
    Ok(header)
}

/// Load a map. The header must agree with the decoded world; field sight
/// caches are not stored, so the result starts with `transparency_dirty` set.
pub fn load_snapshot(path: &Path) -> Result<World, SnapshotError> {
    let data = fs::read(path)?;
    let mut rest: &[u8] = &data;
    let header: SnapshotHeader = bincode::deserialize_from(&mut rest)
        .map_err(|e| SnapshotError::Deserialize(e.to_string()))?;
    if header.magic != MAGIC {
        return Err(SnapshotError::Corrupt(path.to_path_buf()));
    }
    let mut world: World =
        bincode::deserialize(rest).map_err(|e| SnapshotError::Deserialize(e.to_string()))?;

    if !header.matches(&world) {
        return Err(SnapshotError::Corrupt(path.to_path_buf()));
    }
    world.transparency_dirty = true;
    Ok(world)
}

/// Snapshots in `snapshot_dir`, newest first. Files whose header cannot be
/// read are logged and left out.
pub fn list_snapshots(snapshot_dir: &Path) -> Result<Vec<SnapshotMetadata>, SnapshotError> {
    if !snapshot_dir.exists() {
        return Ok(Vec::new());
    }

    let mut snapshots = Vec::new();
    for entry in fs::read_dir(snapshot_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !path.is_file() || !is_snapshot_name(name) {
            continue;
        }
        match read_header(&path) {
            Ok(h) => snapshots.push(SnapshotMetadata {
                file_size: fs::metadata(&path).map(|m| m.len()).unwrap_or(0),
                path,
                tick_count: h.tick,
                saved_at_ms: h.saved_at_ms,
                width: h.width,
                height: h.height,
                active_tiles: h.active_tiles,
                field_entries: h.field_entries,
                creatures: h.creatures,
            }),
            Err(e) => warn!(path = %path.display(), error = %e, "Unreadable snapshot header"),
        }
    }

    snapshots.sort_by(|a, b| {
        b.saved_at_ms
            .cmp(&a.saved_at_ms)
            .then(b.tick_count.cmp(&a.tick_count))
    });
    Ok(snapshots)
}

/// Keep the `max_snapshots` newest snapshots and delete the rest, along with
/// temp files left by interrupted saves. Returns what was deleted.
pub fn prune_snapshots(
    snapshot_dir: &Path,
    max_snapshots: usize,
) -> Result<Vec<PathBuf>, SnapshotError> {
    let mut deleted = Vec::new();
    for stale in list_snapshots(snapshot_dir)?.into_iter().skip(max_snapshots) {
        fs::remove_file(&stale.path)?;
        deleted.push(stale.path);
    }

    if snapshot_dir.exists() {
        for entry in fs::read_dir(snapshot_dir)? {
            let path = entry?.path();
            if path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_temp_name)
            {
                fs::remove_file(&path)?;
                deleted.push(path);
            }
        }
    }
    Ok(deleted)
}

/// Load the newest snapshot that decodes cleanly, skipping damaged ones.
pub fn load_latest_valid_snapshot(snapshot_dir: &Path) -> Result<World, SnapshotError> {
    for snapshot in list_snapshots(snapshot_dir)? {
        match load_snapshot(&snapshot.path) {
            Ok(world) => return Ok(world),
            Err(e) => warn!(
                path = %snapshot.path.display(),
                error = %e,
                "Corrupt snapshot, trying next"
            ),
        }
    }
    Err(SnapshotError::NoValidSnapshots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::generation::GenerationParams;
    use crate::field::FieldKind;
    use crate::world::generation::generate_world;
    use crate::world::Point;
    use tempfile::TempDir;

    fn generated(seed: u64) -> World {
        generate_world(&GenerationParams {
            seed,
            width: 24,
            height: 16,
            ..GenerationParams::default()
        })
    }

    fn smoky(tick: u64) -> World {
        let mut world = World::blank(8, 8);
        world.tick_count = tick;
        world.add_field(Point::new(1, 1), FieldKind::Smoke, 2, 5);
        world.add_field(Point::new(1, 1), FieldKind::Fire, 1, 0);
        world.add_field(Point::new(6, 2), FieldKind::Acid, 3, 0);
        world
    }

    #[test]
    fn generated_map_round_trips() {
        let dir = TempDir::new().unwrap();
        let world = generated(42);
        let path = save_snapshot(&world, dir.path()).unwrap();
        let restored = load_snapshot(&path).unwrap();
        assert_eq!(restored, world);
        assert!(restored.transparency_dirty);
    }

    #[test]
    fn field_age_and_density_survive() {
        let dir = TempDir::new().unwrap();
        let mut world = World::blank(8, 8);
        world.add_field(Point::new(2, 3), FieldKind::Fire, 3, -700);
        world.add_field(Point::new(2, 3), FieldKind::Smoke, 1, 40);

        let path = save_snapshot(&world, dir.path()).unwrap();
        let restored = load_snapshot(&path).unwrap();
        let fire = restored.get_field(Point::new(2, 3), FieldKind::Fire).unwrap();
        assert_eq!((fire.density(), fire.age()), (3, -700));
        assert_eq!(restored.field_count(Point::new(2, 3)), 2);
    }

    #[test]
    fn listing_reads_the_map_summary() {
        let dir = TempDir::new().unwrap();
        save_snapshot(&smoky(7), dir.path()).unwrap();

        let listed = list_snapshots(dir.path()).unwrap();
        assert_eq!(listed.len(), 1);
        let meta = &listed[0];
        assert_eq!((meta.width, meta.height, meta.tick_count), (8, 8, 7));
        assert_eq!(meta.active_tiles, 2);
        assert_eq!(meta.field_entries, 3);
        assert!(meta.file_size > 0);
    }

    #[test]
    fn listing_is_newest_first_and_ignores_strangers() {
        let dir = TempDir::new().unwrap();
        write_snapshot(&smoky(10), dir.path(), 1_000).unwrap();
        write_snapshot(&smoky(30), dir.path(), 3_000).unwrap();
        write_snapshot(&smoky(20), dir.path(), 2_000).unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        fs::write(dir.path().join("hazards-t99-1.bin"), b"garbage").unwrap();

        let ticks: Vec<u64> = list_snapshots(dir.path())
            .unwrap()
            .iter()
            .map(|m| m.tick_count)
            .collect();
        assert_eq!(ticks, vec![30, 20, 10]);
    }

    #[test]
    fn saves_in_the_same_instant_get_distinct_files() {
        let dir = TempDir::new().unwrap();
        let world = smoky(4);
        let a = write_snapshot(&world, dir.path(), 500).unwrap();
        let b = write_snapshot(&world, dir.path(), 500).unwrap();
        assert_ne!(a, b);
        assert_eq!(list_snapshots(dir.path()).unwrap().len(), 2);
    }

    #[test]
    fn prune_keeps_newest_and_sweeps_temp_files() {
        let dir = TempDir::new().unwrap();
        for i in 0..5u64 {
            write_snapshot(&smoky(i), dir.path(), 1_000 + i).unwrap();
        }
        fs::write(dir.path().join(".hazards-t9-9.bin.tmp"), "half").unwrap();

        let deleted = prune_snapshots(dir.path(), 2).unwrap();
        assert_eq!(deleted.len(), 4);

        let left: Vec<u64> = list_snapshots(dir.path())
            .unwrap()
            .iter()
            .map(|m| m.tick_count)
            .collect();
        assert_eq!(left, vec![4, 3]);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn header_disagreeing_with_map_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let mut world = smoky(3);
        let mut header = SnapshotHeader::describe(&world, 1);
        header.tick = 99;
        world.tiles.pop();
        let mut bytes = bincode::serialize(&header).unwrap();
        bytes.extend(bincode::serialize(&world).unwrap());
        let path = dir.path().join(file_name(99, 1));
        fs::write(&path, bytes).unwrap();

        assert!(matches!(load_snapshot(&path), Err(SnapshotError::Corrupt(_))));
    }

    #[test]
    fn truncated_newest_falls_back_to_older() {
        let dir = TempDir::new().unwrap();
        write_snapshot(&smoky(1), dir.path(), 1_000).unwrap();
        let newest = write_snapshot(&smoky(2), dir.path(), 2_000).unwrap();
        let bytes = fs::read(&newest).unwrap();
        fs::write(&newest, &bytes[..bytes.len() / 2]).unwrap();

        assert!(load_snapshot(&newest).is_err());
        let world = load_latest_valid_snapshot(dir.path()).unwrap();
        assert_eq!(world.tick_count, 1);
    }

    #[test]
    fn nothing_loadable_is_reported() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_latest_valid_snapshot(dir.path()),
            Err(SnapshotError::NoValidSnapshots)
        ));
        fs::write(dir.path().join("hazards-t1-1.bin"), b"junk").unwrap();
        assert!(matches!(
            load_latest_valid_snapshot(&dir.path().join("missing")),
            Err(SnapshotError::NoValidSnapshots)
        ));
        assert!(matches!(
            load_latest_valid_snapshot(dir.path()),
            Err(SnapshotError::NoValidSnapshots)
        ));
    }
}
