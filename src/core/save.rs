use crate::core::constants::SAVE_VERSION_MAGIC;
use crate::core::game_state::GameState;
use directories::ProjectDirs;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

/// Manages saving and loading game state with checksummed binary format
pub struct SaveManager {
    save_path: PathBuf,
}

impl SaveManager {
    /// Creates a new SaveManager instance
    ///
    /// Sets up the save directory at the appropriate location for the platform
    /// using the `directories` crate.
    pub fn new() -> io::Result<Self> {
        let project_dirs = ProjectDirs::from("", "", "hoard").ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine config directory",
            )
        })?;

        let config_dir = project_dirs.config_dir();
        fs::create_dir_all(config_dir)?;

        let save_path = config_dir.join("save.dat");

        Ok(Self { save_path })
    }

    /// Creates a SaveManager for testing with a unique temporary directory
    #[cfg(test)]
    fn new_for_test() -> io::Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

        let test_id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir = std::env::temp_dir().join(format!("hoard-test-{}", test_id));
        fs::create_dir_all(&temp_dir)?;

        let save_path = temp_dir.join("save.dat");
        Ok(Self { save_path })
    }

    /// Saves the game state to disk with checksum verification
    ///
    /// File format:
    /// - Version magic (8 bytes)
    /// - Data length (4 bytes)
    /// - Serialized game state (variable length)
    /// - SHA256 checksum (32 bytes)
    pub fn save(&self, state: &GameState) -> io::Result<()> {
        // Serialize the game state
        let data =
            bincode::serialize(state).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let data_len = data.len() as u32;

        // Compute checksum over version + length + data
        let mut hasher = Sha256::new();
        hasher.update(SAVE_VERSION_MAGIC.to_le_bytes());
        hasher.update(data_len.to_le_bytes());
        hasher.update(&data);
        let checksum = hasher.finalize();

        // Write to file
        let mut file = fs::File::create(&self.save_path)?;
        file.write_all(&SAVE_VERSION_MAGIC.to_le_bytes())?;
        file.write_all(&data_len.to_le_bytes())?;
        file.write_all(&data)?;
        file.write_all(&checksum)?;

        Ok(())
    }

    /// Loads the game state from disk with checksum verification
    ///
    /// Returns an error if:
    /// - The file doesn't exist
    /// - The version magic is incorrect
    /// - The checksum verification fails
    /// - The data cannot be deserialized
    pub fn load(&self) -> io::Result<GameState> {
        let mut file = fs::File::open(&self.save_path)?;

        // Read and verify version magic
        let mut version_bytes = [0u8; 8];
        file.read_exact(&mut version_bytes)?;
        let version = u64::from_le_bytes(version_bytes);

        if version != SAVE_VERSION_MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Invalid save version: expected 0x{:016X}, got 0x{:016X}",
                    SAVE_VERSION_MAGIC, version
                ),
            ));
        }

        // Read data length
        let mut length_bytes = [0u8; 4];
        file.read_exact(&mut length_bytes)?;
        let data_len = u32::from_le_bytes(length_bytes);

        // Read data
        let mut data = vec![0u8; data_len as usize];
        file.read_exact(&mut data)?;

        // Read checksum
        let mut stored_checksum = [0u8; 32];
        file.read_exact(&mut stored_checksum)?;

        // Verify checksum
        let mut hasher = Sha256::new();
        hasher.update(version_bytes);
        hasher.update(length_bytes);
        hasher.update(&data);
        let computed_checksum = hasher.finalize();

        if stored_checksum != computed_checksum.as_slice() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Checksum verification failed",
            ));
        }

        bincode::deserialize::<GameState>(&data)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Checks if a save file exists
    pub fn save_exists(&self) -> bool {
        self.save_path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brawl::types::BrawlRarity;
    use crate::loot::types::{CrateTier, CrateType};
    use crate::rebirth::UpgradeId;
    use std::fs;

    #[test]
    fn test_save_and_load() {
        let manager = SaveManager::new_for_test().expect("Failed to create SaveManager");

        // Clean up any existing save file
        if manager.save_exists() {
            fs::remove_file(&manager.save_path).expect("Failed to remove existing save file");
        }

        // Create a game state with some non-default values
        let mut original_state = GameState::new(1234567890);
        original_state.coins = -42;
        original_state.play_time_seconds = 3600;
        original_state.add_item("Iron Knuckles", 3);
        original_state.add_potion("Minor Luck Potion", 2);
        original_state.equipped_weapon = Some("Iron Knuckles".to_string());
        original_state.add_crate(CrateType::Standard(CrateTier::Epic), 7);
        original_state.brawl_progress.insert(BrawlRarity::Rare, 12);
        original_state.taverns_beaten.insert(BrawlRarity::Common);
        original_state.rebirth_tokens = 17;
        original_state
            .rebirth_upgrades
            .insert(UpgradeId::GoldenTouch, 2);
        original_state.stats.crates_opened = 99;

        // Save the state
        manager
            .save(&original_state)
            .expect("Failed to save game state");

        // Verify the file exists
        assert!(manager.save_exists());

        // Load the state
        let loaded_state = manager.load().expect("Failed to load game state");

        // Verify the loaded state matches the original
        assert_eq!(loaded_state.coins, original_state.coins);
        assert_eq!(
            loaded_state.play_time_seconds,
            original_state.play_time_seconds
        );
        assert_eq!(loaded_state.item_count("Iron Knuckles"), 3);
        assert_eq!(loaded_state.potion_count("Minor Luck Potion"), 2);
        assert_eq!(
            loaded_state.equipped_weapon,
            original_state.equipped_weapon
        );
        assert_eq!(
            loaded_state.crate_count(CrateType::Standard(CrateTier::Epic)),
            7
        );
        assert_eq!(loaded_state.brawl_progress[&BrawlRarity::Rare], 12);
        assert!(loaded_state.taverns_beaten.contains(&BrawlRarity::Common));
        assert_eq!(loaded_state.rebirth_tokens, 17);
        assert_eq!(loaded_state.upgrade_tier(UpgradeId::GoldenTouch), 2);
        assert_eq!(loaded_state.stats.crates_opened, 99);
        assert_eq!(loaded_state.discovered_items, vec!["Iron Knuckles"]);

        // Clean up
        fs::remove_file(&manager.save_path).expect("Failed to remove save file");
    }

    #[test]
    fn test_active_brawl_is_not_persisted() {
        let manager = SaveManager::new_for_test().expect("Failed to create SaveManager");

        let mut state = GameState::new(0);
        crate::brawl::logic::initiate_brawl(&mut state, BrawlRarity::Common, 0, 0);
        assert!(state.active_brawl.is_some());

        manager.save(&state).unwrap();
        let loaded = manager.load().unwrap();
        assert!(loaded.active_brawl.is_none());

        fs::remove_file(&manager.save_path).unwrap();
    }

    #[test]
    fn test_load_nonexistent() {
        let manager = SaveManager::new_for_test().expect("Failed to create SaveManager");

        // Ensure no save file exists
        if manager.save_exists() {
            fs::remove_file(&manager.save_path).expect("Failed to remove existing save file");
        }

        // Attempt to load should fail
        let result = manager.load();
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_load_corrupted_file_random_bytes() {
        let manager = SaveManager::new_for_test().expect("Failed to create SaveManager");

        // Write random garbage to the save file
        fs::write(&manager.save_path, b"random garbage data that is not valid").unwrap();

        // Attempt to load should fail with InvalidData
        let result = manager.load();
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_load_truncated_file() {
        let manager = SaveManager::new_for_test().expect("Failed to create SaveManager");

        // Write just the version magic (incomplete file)
        fs::write(&manager.save_path, SAVE_VERSION_MAGIC.to_le_bytes()).unwrap();

        // Attempt to load should fail (can't read length)
        let result = manager.load();
        assert!(result.is_err());
    }

    #[test]
    fn test_load_wrong_version_magic() {
        let manager = SaveManager::new_for_test().expect("Failed to create SaveManager");

        // Write a file with wrong version magic
        let wrong_magic: u64 = 0xDEADBEEF;
        let mut data = Vec::new();
        data.extend_from_slice(&wrong_magic.to_le_bytes());
        data.extend_from_slice(&[0u8; 100]); // Pad with zeros
        fs::write(&manager.save_path, &data).unwrap();

        // Attempt to load should fail with InvalidData mentioning version
        let result = manager.load();
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn test_load_bad_checksum() {
        let manager = SaveManager::new_for_test().expect("Failed to create SaveManager");

        // First save a valid state
        let state = GameState::new(0);
        manager.save(&state).unwrap();

        // Read the file and corrupt the checksum (last 32 bytes)
        let mut data = fs::read(&manager.save_path).unwrap();
        let len = data.len();
        // Flip some bits in the checksum
        data[len - 1] ^= 0xFF;
        data[len - 2] ^= 0xFF;
        fs::write(&manager.save_path, &data).unwrap();

        // Attempt to load should fail with checksum error
        let result = manager.load();
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("Checksum"));
    }

    #[test]
    fn test_load_bad_checksum_corrupted_data() {
        let manager = SaveManager::new_for_test().expect("Failed to create SaveManager");

        // Save a valid state
        let state = GameState::new(0);
        manager.save(&state).unwrap();

        // Read the file and corrupt the data (not the checksum)
        let mut data = fs::read(&manager.save_path).unwrap();
        // Corrupt byte in the middle of the data (after header: 8 + 4 = 12 bytes)
        if data.len() > 20 {
            data[15] ^= 0xFF;
            data[16] ^= 0xFF;
        }
        fs::write(&manager.save_path, &data).unwrap();

        // Attempt to load should fail with checksum error
        let result = manager.load();
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_save_overwrites_existing() {
        let manager = SaveManager::new_for_test().expect("Failed to create SaveManager");

        // Save first state
        let mut state1 = GameState::new(0);
        state1.coins = 10;
        manager.save(&state1).unwrap();

        // Save second state (should overwrite)
        let mut state2 = GameState::new(0);
        state2.coins = 50;
        manager.save(&state2).unwrap();

        // Load should return second state
        let loaded = manager.load().unwrap();
        assert_eq!(loaded.coins, 50);

        // Clean up
        fs::remove_file(&manager.save_path).unwrap();
    }
}
