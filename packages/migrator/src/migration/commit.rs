use tracing::{error, info};

use super::{MigrationOrchestrator, PostOutcome};
use crate::model::Post;
use crate::target::{BaseTargetClient, RemotePost};

impl<T: BaseTargetClient> MigrationOrchestrator<T> {
    /// Two-phase commit: import the raw file, then overwrite the created post
    /// with the rewritten content and cover image.
    ///
    /// The import can only take the file as it sits on disk, which still has
    /// local image references. Only the import result decides success; a failed
    /// update is logged and reported as `Imported { updated: false }`.
    pub async fn commit_post(&self, post: &Post) -> PostOutcome {
        let imported = match self.target.import_markdown(&post.source_path).await {
            Ok(imported) => imported,
            Err(e) => {
                error!(
                    post_id = %post.meta.id,
                    file = %post.source_path.display(),
                    error = %format!("{:#}", e),
                    "[ERROR] import failed"
                );
                return PostOutcome::ImportFailed;
            }
        };
        info!(remote_id = imported.id, title = %imported.title, "Import succeeded");

        let corrected = RemotePost {
            content: Some(post.content.clone()),
            thumbnail: Some(post.frontmatter.cover_image.clone().unwrap_or_default()),
            ..imported
        };

        match self.target.update_post(&corrected).await {
            Ok(()) => {
                info!(remote_id = corrected.id, "[OK] update succeeded");
                PostOutcome::Imported { updated: true }
            }
            Err(e) => {
                error!(
                    post_id = %post.meta.id,
                    remote_id = corrected.id,
                    error = %format!("{:#}", e),
                    "[ERROR] update failed, post keeps its imported content"
                );
                PostOutcome::Imported { updated: false }
            }
        }
    }
}
