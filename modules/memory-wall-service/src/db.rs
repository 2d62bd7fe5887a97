//! SQLite document store for guestbook messages and memory records.

use memory_wall_types::{ImageRef, Memory, Message};
use rusqlite::{Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Mutex, MutexGuard};

pub struct Db {
    conn: Mutex<Connection>,
}

/// Listing projection of a memory row: image ids only, no locations.
#[derive(Debug, Clone)]
pub struct MemoryListing {
    pub id: String,
    pub title: String,
    pub date: String,
    pub description: String,
    pub tags: Vec<String>,
    pub image_ids: Vec<String>,
}

impl Db {
    pub fn open(path: &str) -> SqliteResult<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.create_tables()?;
        Ok(db)
    }

    fn create_tables(&self) -> SqliteResult<()> {
        let conn = self
            .conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                visitor_name TEXT NOT NULL,
                content TEXT NOT NULL,
                mood TEXT NOT NULL DEFAULT '',
                time TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_messages_time ON messages(time);

            CREATE TABLE IF NOT EXISTS memories (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                tags TEXT NOT NULL DEFAULT '[]',
                images TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_memories_date ON memories(date);

            CREATE TABLE IF NOT EXISTS memory_images (
                image_id TEXT PRIMARY KEY,
                memory_id TEXT NOT NULL REFERENCES memories(id) ON DELETE CASCADE,
                position INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_memory_images_memory
                ON memory_images(memory_id, position);",
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, String> {
        self.conn
            .lock()
            .map_err(|_| "Database lock poisoned".to_string())
    }

    /// Leave the connection lock poisoned so every query fails.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::thread::scope(|s| {
            s.spawn(|| {
                let _guard = self.conn.lock();
                panic!("poisoning database lock");
            })
            .join()
        });
    }

    // =====================================================
    // Messages
    // =====================================================

    pub fn insert_message(
        &self,
        visitor_name: &str,
        content: &str,
        mood: &str,
        time: &str,
    ) -> Result<Message, String> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO messages (visitor_name, content, mood, time) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![visitor_name, content, mood, time],
        )
        .map_err(|e| format!("Failed to insert message: {}", e))?;

        Ok(Message {
            id: conn.last_insert_rowid(),
            visitor_name: visitor_name.to_string(),
            content: content.to_string(),
            mood: mood.to_string(),
            time: time.to_string(),
        })
    }

    pub fn list_messages(&self) -> Result<Vec<Message>, String> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, visitor_name, content, mood, time
                 FROM messages
                 ORDER BY time DESC, id DESC",
            )
            .map_err(|e| format!("Failed to prepare query: {}", e))?;

        let messages = stmt
            .query_map([], |row| {
                Ok(Message {
                    id: row.get(0)?,
                    visitor_name: row.get(1)?,
                    content: row.get(2)?,
                    mood: row.get(3)?,
                    time: row.get(4)?,
                })
            })
            .map_err(|e| format!("Failed to query messages: {}", e))?
            .collect::<SqliteResult<Vec<_>>>()
            .map_err(|e| format!("Failed to read message row: {}", e))?;
        Ok(messages)
    }

    pub fn count_messages(&self) -> Result<i64, String> {
        let conn = self.conn()?;
        conn.query_row("SELECT COUNT(*) FROM messages", [], |r| r.get(0))
            .map_err(|e| format!("Failed to count messages: {}", e))
    }

    // =====================================================
    // Memories
    // =====================================================

    /// Store a memory and index its image ids in one transaction.
    pub fn insert_memory(&self, memory: &Memory) -> Result<(), String> {
        let tags = serde_json::to_string(&memory.tags)
            .map_err(|e| format!("Failed to encode tags: {}", e))?;
        let images = serde_json::to_string(&memory.images)
            .map_err(|e| format!("Failed to encode images: {}", e))?;

        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| format!("Failed to begin transaction: {}", e))?;
        tx.execute(
            "INSERT INTO memories (id, title, date, description, tags, images, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                memory.id,
                memory.title,
                memory.date,
                memory.description,
                tags,
                images,
                memory.created_at
            ],
        )
        .map_err(|e| format!("Failed to insert memory: {}", e))?;

        for (position, image) in memory.images.iter().enumerate() {
            tx.execute(
                "INSERT INTO memory_images (image_id, memory_id, position) VALUES (?1, ?2, ?3)",
                rusqlite::params![image.id, memory.id, position as i64],
            )
            .map_err(|e| format!("Failed to index image {}: {}", image.id, e))?;
        }

        tx.commit()
            .map_err(|e| format!("Failed to commit memory: {}", e))
    }

    /// One page of memories, newest date first. `page` is 1-based.
    pub fn list_memories(&self, page: u32, limit: u32) -> Result<Vec<MemoryListing>, String> {
        let offset = (page.max(1) as i64 - 1) * limit as i64;
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, title, date, description, tags
                 FROM memories
                 ORDER BY date DESC, created_at DESC, id
                 LIMIT ?1 OFFSET ?2",
            )
            .map_err(|e| format!("Failed to prepare query: {}", e))?;

        let rows = stmt
            .query_map(rusqlite::params![limit as i64, offset], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map_err(|e| format!("Failed to query memories: {}", e))?
            .collect::<SqliteResult<Vec<_>>>()
            .map_err(|e| format!("Failed to read memory row: {}", e))?;

        let mut image_stmt = conn
            .prepare(
                "SELECT image_id FROM memory_images WHERE memory_id = ?1 ORDER BY position",
            )
            .map_err(|e| format!("Failed to prepare query: {}", e))?;

        let mut listings = Vec::with_capacity(rows.len());
        for (id, title, date, description, tags) in rows {
            let image_ids = image_stmt
                .query_map(rusqlite::params![id], |row| row.get::<_, String>(0))
                .map_err(|e| format!("Failed to query images of {}: {}", id, e))?
                .collect::<SqliteResult<Vec<_>>>()
                .map_err(|e| format!("Failed to read image row: {}", e))?;
            let tags: Vec<String> = serde_json::from_str(&tags)
                .map_err(|e| format!("Corrupt tags on memory {}: {}", id, e))?;
            listings.push(MemoryListing {
                id,
                tags,
                title,
                date,
                description,
                image_ids,
            });
        }
        Ok(listings)
    }

    /// Resolve an image id through the memory that embeds it.
    pub fn find_image(&self, image_id: &str) -> Result<Option<ImageRef>, String> {
        let conn = self.conn()?;
        let images: Option<String> = conn
            .query_row(
                "SELECT m.images
                 FROM memory_images mi
                 JOIN memories m ON m.id = mi.memory_id
                 WHERE mi.image_id = ?1",
                rusqlite::params![image_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| format!("Failed to look up image {}: {}", image_id, e))?;

        let Some(images) = images else {
            return Ok(None);
        };
        let images: Vec<ImageRef> = serde_json::from_str(&images)
            .map_err(|e| format!("Corrupt image list for {}: {}", image_id, e))?;
        Ok(images.into_iter().find(|img| img.id == image_id))
    }

    pub fn count_memories(&self) -> Result<i64, String> {
        let conn = self.conn()?;
        conn.query_row("SELECT COUNT(*) FROM memories", [], |r| r.get(0))
            .map_err(|e| format!("Failed to count memories: {}", e))
    }
}
