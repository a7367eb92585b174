use blog_core::{
    CreatePost, PersistenceContext, Post, PostId, PostRepository, PostService, RepoError,
    RepoResult, ServiceError, UpdatePost,
};
use std::cell::{Cell, RefCell};

/// In-memory row store that records calls and can script affected counts.
#[derive(Default)]
struct FakePostRepository {
    rows: RefCell<Vec<Post>>,
    next_id: Cell<PostId>,
    created_with: RefCell<Vec<CreatePost>>,
    scripted_affected: Cell<Option<usize>>,
    unavailable: Cell<bool>,
}

impl FakePostRepository {
    fn with_rows(rows: Vec<Post>) -> Self {
        let next_id = rows.iter().map(|post| post.id).max().unwrap_or(0);
        let repo = Self::default();
        repo.next_id.set(next_id);
        *repo.rows.borrow_mut() = rows;
        repo
    }

    fn script_affected(&self, affected: usize) {
        self.scripted_affected.set(Some(affected));
    }

    fn unavailable() -> Self {
        let repo = Self::default();
        repo.unavailable.set(true);
        repo
    }

    fn check_available(&self) -> RepoResult<()> {
        if self.unavailable.get() {
            return Err(store_unavailable());
        }
        Ok(())
    }
}

fn store_unavailable() -> RepoError {
    RepoError::MissingRequiredTable("posts")
}

impl PostRepository for FakePostRepository {
    fn create(&self, input: &CreatePost) -> RepoResult<Post> {
        self.check_available()?;
        self.created_with.borrow_mut().push(input.clone());
        self.next_id.set(self.next_id.get() + 1);
        let post = input.clone().into_post(self.next_id.get());
        self.rows.borrow_mut().push(post.clone());
        Ok(post)
    }

    fn find_all(&self) -> RepoResult<Vec<Post>> {
        self.check_available()?;
        Ok(self.rows.borrow().clone())
    }

    fn find_one(&self, id: PostId) -> RepoResult<Option<Post>> {
        self.check_available()?;
        Ok(self.rows.borrow().iter().find(|post| post.id == id).cloned())
    }

    fn native_update(&self, id: PostId, patch: &UpdatePost) -> RepoResult<usize> {
        self.check_available()?;
        if let Some(affected) = self.scripted_affected.get() {
            return Ok(affected);
        }
        let mut rows = self.rows.borrow_mut();
        Ok(rows
            .iter_mut()
            .filter(|post| post.id == id)
            .map(|post| patch.apply_to(post))
            .count())
    }

    fn native_delete(&self, id: PostId) -> RepoResult<usize> {
        self.check_available()?;
        if let Some(affected) = self.scripted_affected.get() {
            return Ok(affected);
        }
        let mut rows = self.rows.borrow_mut();
        let before = rows.len();
        rows.retain(|post| post.id != id);
        Ok(before - rows.len())
    }
}

#[derive(Default)]
struct CountingContext {
    flushes: Cell<usize>,
    discards: Cell<usize>,
    reject_flush: Cell<bool>,
}

impl CountingContext {
    fn rejecting_flush() -> Self {
        let context = Self::default();
        context.reject_flush.set(true);
        context
    }
}

impl PersistenceContext for CountingContext {
    fn flush(&self) -> RepoResult<()> {
        self.flushes.set(self.flushes.get() + 1);
        if self.reject_flush.get() {
            return Err(store_unavailable());
        }
        Ok(())
    }

    fn discard(&self) -> RepoResult<()> {
        self.discards.set(self.discards.get() + 1);
        Ok(())
    }
}

fn sample_input() -> CreatePost {
    CreatePost::new("제목", "내용", "작성자")
}

fn sample_posts() -> Vec<Post> {
    vec![
        CreatePost::new("제목", "내용", "작성자").into_post(1),
        CreatePost::new("제목1", "내용1", "작성자1").into_post(2),
    ]
}

#[test]
fn create_returns_repository_post_and_flushes_once() {
    let repo = FakePostRepository::default();
    let context = CountingContext::default();
    let service = PostService::new(&repo, &context);

    let created = service.create(&sample_input()).unwrap();

    assert_eq!(
        created,
        Post {
            id: 1,
            title: "제목".to_string(),
            content: "내용".to_string(),
            writer: "작성자".to_string(),
        }
    );
    assert_eq!(*repo.created_with.borrow(), vec![sample_input()]);
    assert_eq!(context.flushes.get(), 1);
}

#[test]
fn find_all_returns_every_post_in_order() {
    let repo = FakePostRepository::with_rows(sample_posts());
    let context = CountingContext::default();
    let service = PostService::new(&repo, &context);

    assert_eq!(service.find_all().unwrap(), sample_posts());
}

#[test]
fn find_all_returns_empty_vec_when_store_is_empty() {
    let service = PostService::new(FakePostRepository::default(), CountingContext::default());

    assert!(service.find_all().unwrap().is_empty());
}

#[test]
fn find_all_is_stable_without_writes() {
    let service = PostService::new(
        FakePostRepository::with_rows(sample_posts()),
        CountingContext::default(),
    );

    assert_eq!(service.find_all().unwrap(), service.find_all().unwrap());
}

#[test]
fn find_one_returns_existing_post() {
    let service = PostService::new(
        FakePostRepository::with_rows(sample_posts()),
        CountingContext::default(),
    );

    let post = service.find_one(1).unwrap();
    assert_eq!(post, sample_posts()[0]);
}

#[test]
fn find_one_missing_post_is_not_found_with_404() {
    let service = PostService::new(FakePostRepository::default(), CountingContext::default());

    let err = service.find_one(1).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(1)));
    assert_eq!(err.status(), 404);
}

#[test]
fn update_single_affected_row_returns_true() {
    let repo = FakePostRepository::default();
    repo.script_affected(1);
    let service = PostService::new(&repo, CountingContext::default());

    assert!(service.update(1, &UpdatePost::from(sample_input())).unwrap());
}

#[test]
fn update_zero_affected_rows_is_not_found_with_404() {
    let repo = FakePostRepository::default();
    repo.script_affected(0);
    let service = PostService::new(&repo, CountingContext::default());

    let err = service
        .update(1, &UpdatePost::from(sample_input()))
        .unwrap_err();
    assert_eq!(err.status(), 404);
}

#[test]
fn update_multiple_affected_rows_is_ambiguous() {
    let repo = FakePostRepository::default();
    repo.script_affected(2);
    let service = PostService::new(&repo, CountingContext::default());

    let err = service.update(1, &UpdatePost::default()).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::AmbiguousMatch { id: 1, affected: 2 }
    ));
    assert_eq!(err.status(), 500);
}

#[test]
fn update_applies_patch_through_repository() {
    let repo = FakePostRepository::with_rows(sample_posts());
    let service = PostService::new(&repo, CountingContext::default());
    let patch = UpdatePost {
        title: Some("새 제목".to_string()),
        ..UpdatePost::default()
    };

    assert!(service.update(2, &patch).unwrap());

    let updated = service.find_one(2).unwrap();
    assert_eq!(updated.title, "새 제목");
    assert_eq!(updated.content, "내용1");
}

#[test]
fn delete_removes_post_then_reports_not_found() {
    let repo = FakePostRepository::with_rows(sample_posts());
    let context = CountingContext::default();
    let service = PostService::new(&repo, &context);

    assert!(service.delete(1).unwrap());
    assert!(service.delete(1).unwrap_err().is_not_found());
    assert_eq!(service.find_all().unwrap().len(), 1);
    assert_eq!(context.flushes.get(), 0);
}

#[test]
fn create_failure_propagates_without_flush() {
    let repo = FakePostRepository::unavailable();
    let context = CountingContext::default();
    let service = PostService::new(&repo, &context);

    let err = service.create(&sample_input()).unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Repo(RepoError::MissingRequiredTable("posts"))
    ));
    assert_eq!(err.status(), 500);
    assert_eq!(context.flushes.get(), 0);
    assert_eq!(context.discards.get(), 0);
}

#[test]
fn flush_failure_discards_and_propagates() {
    let repo = FakePostRepository::default();
    let context = CountingContext::rejecting_flush();
    let service = PostService::new(&repo, &context);

    let err = service.create(&sample_input()).unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Repo(RepoError::MissingRequiredTable("posts"))
    ));
    assert_eq!(context.flushes.get(), 1);
    assert_eq!(context.discards.get(), 1);
}

#[test]
fn read_and_write_failures_surface_as_repo_errors() {
    let service = PostService::new(FakePostRepository::unavailable(), CountingContext::default());

    let errors = [
        service.find_all().unwrap_err(),
        service.find_one(1).unwrap_err(),
        service.update(1, &UpdatePost::default()).unwrap_err(),
        service.delete(1).unwrap_err(),
    ];
    for err in errors {
        assert!(matches!(err, ServiceError::Repo(_)), "unexpected error: {err}");
        assert!(!err.is_not_found());
        assert_eq!(err.status(), 500);
    }
}
