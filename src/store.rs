// src/store.rs

//! Flat-file store for community posts.
//!
//! The whole collection lives in one JSON array. Every mutation is a
//! read-modify-write performed while holding a single async mutex, and the new
//! array is written to a sibling temp file that is then renamed over the
//! original, so readers never observe a half-written file.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::{fs, sync::Mutex};

use crate::{error::AppError, models::post::Post};

#[derive(Clone)]
pub struct PostStore {
    path: Arc<Mutex<PathBuf>>,
}

impl PostStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(Mutex::new(path.into())),
        }
    }

    /// Returns every post in stored order (newest first).
    pub async fn all(&self) -> Result<Vec<Post>, AppError> {
        let path = self.path.lock().await;
        read_posts(&path).await
    }

    /// Applies `f` to the collection and persists the result.
    ///
    /// Nothing is written when `f` returns an error.
    pub async fn mutate<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Vec<Post>) -> Result<T, AppError>,
    {
        let path = self.path.lock().await;
        let mut posts = read_posts(&path).await?;
        let out = f(&mut posts)?;
        write_posts(&path, &posts).await?;
        Ok(out)
    }

    /// Applies `f` to the post with `id`. Missing posts become 404.
    pub async fn update<T, F>(&self, id: &str, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Post) -> Result<T, AppError>,
    {
        self.mutate(|posts| {
            let post = posts
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
            f(post)
        })
        .await
    }
}

async fn read_posts(path: &Path) -> Result<Vec<Post>, AppError> {
    match fs::read(path).await {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
            AppError::InternalServerError(format!(
                "Post store {} is corrupt: {}",
                path.display(),
                e
            ))
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

async fn write_posts(path: &Path, posts: &[Post]) -> Result<(), AppError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).await?;
    }

    let bytes = serde_json::to_vec_pretty(posts)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str) -> Post {
        Post {
            id: id.to_string(),
            author: "Ann".to_string(),
            author_id: "u1".to_string(),
            author_avatar: None,
            author_verified: false,
            date: chrono::Utc::now(),
            title: "Hello".to_string(),
            content: "World".to_string(),
            upvotes: 0,
            likes: 0,
            liked_by: Vec::new(),
            views: 0,
            comments: 0,
            comments_list: Vec::new(),
            image: None,
            category: None,
        }
    }

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("posts-{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let store = PostStore::new(temp_path());
        assert!(store.all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_mutation_is_not_persisted() {
        let path = temp_path();
        let store = PostStore::new(&path);
        store
            .mutate(|posts| {
                posts.push(sample("a"));
                Ok(())
            })
            .await
            .unwrap();

        let res: Result<(), AppError> = store
            .mutate(|posts| {
                posts.clear();
                Err(AppError::BadRequest("nope".to_string()))
            })
            .await;
        assert!(res.is_err());
        assert_eq!(store.all().await.unwrap().len(), 1);

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn concurrent_updates_are_not_lost() {
        let path = temp_path();
        let store = PostStore::new(&path);
        store
            .mutate(|posts| {
                posts.push(sample("a"));
                Ok(())
            })
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .update("a", |p| {
                        p.upvotes += 1;
                        Ok(())
                    })
                    .await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let posts = store.all().await.unwrap();
        assert_eq!(posts[0].upvotes, 20);

        let _ = std::fs::remove_file(path);
    }
}
