//! Storage integration tests
//!
//! Exercises the façade against the in-memory adapter, with a disk-backed
//! pass over the rename cascade at the end.

use std::sync::Arc;

use rax_storage::{
    LocalAdapter, MemoryAdapter, MimeType, Storage, StorageError, StorageOptions,
};

fn memory_storage() -> Storage {
    let _ = env_logger::builder().is_test(true).try_init();
    Storage::new(MemoryAdapter::new(), StorageOptions::new("/"))
}

#[tokio::test]
async fn test_file_handle_identity() {
    let storage = memory_storage();

    let first = storage.get_file("dir/file.txt");
    let second = storage.get_file("dir/file.txt");
    assert!(Arc::ptr_eq(&first, &second));

    // Equivalent spellings normalize to the same entity.
    let third = storage.get_file("/dir//file.txt");
    assert!(Arc::ptr_eq(&first, &third));

    let dir_one = storage.get_directory("dir");
    let dir_two = storage.get_directory("dir/");
    assert!(Arc::ptr_eq(&dir_one, &dir_two));
}

#[tokio::test]
async fn test_write_returns_the_registered_handle() {
    let storage = memory_storage();

    let written = storage.write("notes.txt", "hello").await.unwrap();
    let fetched = storage.get_file("notes.txt");
    assert!(Arc::ptr_eq(&written, &fetched));
}

#[tokio::test]
async fn test_round_trip() {
    let storage = memory_storage();

    storage.write("data.txt", "contents").await.unwrap();
    assert_eq!(storage.read("data.txt").await.unwrap(), "contents");

    storage.put("data.txt", "first").await.unwrap();
    storage.put("data.txt", "second").await.unwrap();
    assert_eq!(storage.read("data.txt").await.unwrap(), "second");
}

#[tokio::test]
async fn test_existence_guards() {
    let storage = memory_storage();

    storage.write("present.txt", "x").await.unwrap();
    assert!(matches!(
        storage.write("present.txt", "y").await,
        Err(StorageError::FileAlreadyExists(_))
    ));

    assert!(matches!(
        storage.read("absent.txt").await,
        Err(StorageError::FileNotExists(_))
    ));
    assert!(matches!(
        storage.update("absent.txt", "x").await,
        Err(StorageError::FileNotExists(_))
    ));
    assert!(matches!(
        storage.prepend("absent.txt", "x").await,
        Err(StorageError::FileNotExists(_))
    ));
    assert!(matches!(
        storage.append("absent.txt", "x").await,
        Err(StorageError::FileNotExists(_))
    ));
    assert!(matches!(
        storage.rename("absent.txt", "other.txt").await,
        Err(StorageError::FileNotExists(_))
    ));
    assert!(matches!(
        storage.copy("absent.txt", "other.txt").await,
        Err(StorageError::FileNotExists(_))
    ));
    assert!(matches!(
        storage.delete("absent.txt").await,
        Err(StorageError::FileNotExists(_))
    ));

    storage.create_directory("taken").await.unwrap();
    assert!(matches!(
        storage.create_directory("taken").await,
        Err(StorageError::DirectoryAlreadyExists(_))
    ));
    assert!(matches!(
        storage.delete_directory("missing").await,
        Err(StorageError::DirectoryNotExists(_))
    ));
    assert!(matches!(
        storage.read_directory("missing").await,
        Err(StorageError::DirectoryNotExists(_))
    ));
}

#[tokio::test]
async fn test_update_prepend_append() {
    let storage = memory_storage();

    storage.write("log.txt", "line").await.unwrap();
    storage.prepend("log.txt", ">> ").await.unwrap();
    storage.append("log.txt", " <<").await.unwrap();
    assert_eq!(storage.read("log.txt").await.unwrap(), ">> line <<");

    storage.update("log.txt", "replaced").await.unwrap();
    assert_eq!(storage.read("log.txt").await.unwrap(), "replaced");
}

#[tokio::test]
async fn test_rename_cascade_repoints_existing_handles() {
    let storage = memory_storage();

    storage.create_directory("test").await.unwrap();
    storage.write("test/a.txt", "a").await.unwrap();
    storage.write("test/b.txt", "b").await.unwrap();

    let a = storage.get_file("test/a.txt");
    let b = storage.get_file("test/b.txt");
    let directory = storage.get_directory("test");

    directory.rename("dir").await.unwrap();

    assert_eq!(directory.path(), "dir");
    assert_eq!(a.path(), "dir/a.txt");
    assert_eq!(b.path(), "dir/b.txt");

    // The handles still resolve against the backend at their new paths.
    assert_eq!(a.get().await.unwrap(), "a");
    assert_eq!(b.get().await.unwrap(), "b");

    // Identity survives the rename: the rewritten handles are what lookups
    // under the new prefix return.
    assert!(Arc::ptr_eq(&a, &storage.get_file("dir/a.txt")));
    assert!(Arc::ptr_eq(&directory, &storage.get_directory("dir")));
}

#[tokio::test]
async fn test_rename_cascade_reaches_nested_directories() {
    let storage = memory_storage();

    storage.create_directory("root/sub").await.unwrap();
    storage.write("root/sub/deep.txt", "deep").await.unwrap();

    let deep = storage.get_file("root/sub/deep.txt");
    let sub = storage.get_directory("root/sub");

    storage.rename("root", "moved").await.unwrap();

    assert_eq!(sub.path(), "moved/sub");
    assert_eq!(deep.path(), "moved/sub/deep.txt");
    assert_eq!(deep.get().await.unwrap(), "deep");
}

#[tokio::test]
async fn test_file_rename_and_move_to() {
    let storage = memory_storage();

    storage.create_directory("inbox").await.unwrap();
    storage.create_directory("archive").await.unwrap();
    let file = storage.write("inbox/mail.txt", "body").await.unwrap();

    file.rename("inbox/read.txt").await.unwrap();
    assert_eq!(file.path(), "inbox/read.txt");
    assert_eq!(file.name(), "read.txt");

    file.move_to("archive").await.unwrap();
    assert_eq!(file.path(), "archive/read.txt");
    assert_eq!(file.get().await.unwrap(), "body");

    // Moving by directory handle works the same way.
    let inbox = storage.get_directory("inbox");
    file.move_to(&inbox).await.unwrap();
    assert_eq!(file.path(), "inbox/read.txt");
}

#[tokio::test]
async fn test_directory_listing_typing() {
    let storage = memory_storage();

    storage.create_directory("mix/sub").await.unwrap();
    storage.write("mix/one.txt", "1").await.unwrap();
    storage.write("mix/two.txt", "2").await.unwrap();

    let elements = storage.get_files("mix").await.unwrap();
    assert_eq!(elements.len(), 3);

    let files = elements.iter().filter(|e| e.is_file()).count();
    let directories = elements.iter().filter(|e| e.is_directory()).count();
    assert_eq!(files, 2);
    assert_eq!(directories, 1);

    // Listed handles share identity with direct lookups.
    for element in &elements {
        if element.is_file() {
            let direct = storage.get_file(&element.path());
            assert_eq!(direct.path(), element.path());
        }
    }
}

#[tokio::test]
async fn test_directory_files_and_parent() {
    let storage = memory_storage();

    storage.create_directory("a/b").await.unwrap();
    storage.write("a/b/c.txt", "c").await.unwrap();

    let b = storage.get_directory("a/b");
    let listed = b.files().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name(), "c.txt");

    let parent = b.directory();
    assert!(Arc::ptr_eq(&parent, &storage.get_directory("a")));

    let file = storage.get_file("a/b/c.txt");
    assert!(Arc::ptr_eq(&file.directory(), &b));
}

#[tokio::test]
async fn test_entity_delete() {
    let storage = memory_storage();

    let file = storage.write("trash/junk.txt", "x").await.unwrap();
    file.delete().await.unwrap();
    assert!(!storage.has("trash/junk.txt").await);

    let directory = storage.get_directory("trash");
    directory.delete().await.unwrap();
    assert!(!storage.has("trash").await);
}

#[tokio::test]
async fn test_copy_keeps_source() {
    let storage = memory_storage();

    storage.write("orig.txt", "payload").await.unwrap();
    storage.copy("orig.txt", "dup.txt").await.unwrap();

    assert_eq!(storage.read("orig.txt").await.unwrap(), "payload");
    assert_eq!(storage.read("dup.txt").await.unwrap(), "payload");
}

#[tokio::test]
async fn test_stats_size_and_chunks() {
    let storage = memory_storage();

    storage.write("sized.txt", "0123456789").await.unwrap();

    let stats = storage.stats_file("sized.txt").await.unwrap();
    assert!(stats.is_file());
    assert_eq!(stats.size, 10);
    assert_eq!(storage.get_size("sized.txt").await.unwrap(), 10);

    assert_eq!(
        storage.read_chunk("sized.txt", 3, Some(4)).await.unwrap(),
        "3456"
    );
    assert_eq!(
        storage.read_chunk("sized.txt", 2, None).await.unwrap(),
        "01"
    );
}

#[tokio::test]
async fn test_mime_type_instance() {
    let storage = memory_storage();

    storage.write("note.txt", "plain words").await.unwrap();
    let mime = storage.get_mime_type_instance("note.txt").await.unwrap();
    assert!(mime.is(&MimeType::text("plain")));
    assert!(mime.matches("text/*").unwrap());
    assert!(!mime.matches("image/*").unwrap());
}

#[tokio::test]
async fn test_full_path_resolution() {
    let storage = memory_storage();

    let file = storage.get_file("dir/f.txt");
    assert_eq!(file.full_path(), storage.base_path().join("dir/f.txt"));
    assert_eq!(storage.resolve_path("/dir//f.txt"), file.full_path());
}

#[tokio::test]
async fn test_rename_cascade_on_local_disk() {
    let _ = env_logger::builder().is_test(true).try_init();
    let root = tempfile::TempDir::new().unwrap();
    let storage = Storage::new(LocalAdapter::new(), StorageOptions::new(root.path()));

    storage.create_directory("test").await.unwrap();
    storage.write("test/a.txt", "a").await.unwrap();
    storage.write("test/b.txt", "b").await.unwrap();

    let a = storage.get_file("test/a.txt");
    let b = storage.get_file("test/b.txt");
    let directory = storage.get_directory("test");

    directory.rename("dir").await.unwrap();

    assert_eq!(a.path(), "dir/a.txt");
    assert_eq!(b.path(), "dir/b.txt");
    assert!(root.path().join("dir/a.txt").exists());
    assert!(!root.path().join("test").exists());
    assert_eq!(a.get().await.unwrap(), "a");
}
