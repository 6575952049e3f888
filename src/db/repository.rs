use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::{
    Assignment, Course, CourseResource, DiscussionPost, DiscussionTopic, Notification, User,
};
use crate::scrape::assignment::ScrapedAssignment;
use crate::scrape::course::{ScrapedCourse, ScrapedResource};
use crate::scrape::discussion::{ScrapedPost, ScrapedTopic};
use crate::scrape::notification::ScrapedNotification;

// ---------------------------------------------------------------------------
// users

pub async fn insert_user(
    db: &SqlitePool,
    username: &str,
    email: Option<&str>,
    full_name: Option<&str>,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO users
            (username, email, full_name, password_hash, is_active, created_at, cas_is_bound)
        VALUES (?1, ?2, ?3, ?4, 1, ?5, 0)
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(full_name)
    .bind(password_hash)
    .bind(now)
    .execute(db)
    .await?;

    find_user_by_id(db, result.last_insert_rowid())
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

pub async fn find_user_by_id(db: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_user_by_username(
    db: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?1")
        .bind(username)
        .fetch_optional(db)
        .await
}

pub async fn find_user_by_cas_username(
    db: &SqlitePool,
    cas_username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE cas_username = ?1")
        .bind(cas_username)
        .fetch_optional(db)
        .await
}

pub async fn find_user_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?1")
        .bind(email)
        .fetch_optional(db)
        .await
}

/// Overwrites the editable profile columns.
pub async fn update_user(
    db: &SqlitePool,
    id: i64,
    email: Option<&str>,
    full_name: Option<&str>,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE users
        SET email = ?1, full_name = ?2, password_hash = ?3
        WHERE id = ?4
        "#,
    )
    .bind(email)
    .bind(full_name)
    .bind(password_hash)
    .bind(id)
    .execute(db)
    .await?;
    Ok(())
}

/// Removes the user; owned assignments, courses, resources and
/// notifications go with it through `ON DELETE CASCADE`.
pub async fn delete_user(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn bind_cas(
    db: &SqlitePool,
    id: i64,
    cas_username: &str,
    bound_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE users
        SET cas_username = ?1, cas_is_bound = 1, cas_bound_at = ?2
        WHERE id = ?3
        "#,
    )
    .bind(cas_username)
    .bind(bound_at)
    .bind(id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn unbind_cas(db: &SqlitePool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE users
        SET cas_username = NULL, cas_is_bound = 0, cas_bound_at = NULL
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .execute(db)
    .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// assignments

pub async fn find_assignment_by_key(
    conn: &mut SqliteConnection,
    owner_id: i64,
    course_name: &str,
    title: &str,
) -> Result<Option<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(
        "SELECT * FROM assignments WHERE owner_id = ?1 AND course_name = ?2 AND title = ?3",
    )
    .bind(owner_id)
    .bind(course_name)
    .bind(title)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn insert_assignment(
    conn: &mut SqliteConnection,
    owner_id: i64,
    item: &ScrapedAssignment,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO assignments
            (owner_id, course_name, title, description, deadline, is_submitted, score, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(owner_id)
    .bind(&item.course_name)
    .bind(&item.title)
    .bind(&item.description)
    .bind(item.deadline)
    .bind(item.is_submitted)
    .bind(&item.score)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn update_assignment(
    conn: &mut SqliteConnection,
    id: i64,
    item: &ScrapedAssignment,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE assignments
        SET description = ?1, deadline = ?2, is_submitted = ?3, score = ?4
        WHERE id = ?5
        "#,
    )
    .bind(&item.description)
    .bind(item.deadline)
    .bind(item.is_submitted)
    .bind(&item.score)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Newest deadline first; assignments without a deadline go last.
pub async fn list_assignments(
    db: &SqlitePool,
    owner_id: i64,
) -> Result<Vec<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(
        r#"
        SELECT * FROM assignments
        WHERE owner_id = ?1
        ORDER BY deadline IS NULL, deadline DESC, id
        "#,
    )
    .bind(owner_id)
    .fetch_all(db)
    .await
}

pub async fn get_assignment(
    db: &SqlitePool,
    owner_id: i64,
    id: i64,
) -> Result<Option<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>("SELECT * FROM assignments WHERE id = ?1 AND owner_id = ?2")
        .bind(id)
        .bind(owner_id)
        .fetch_optional(db)
        .await
}

// ---------------------------------------------------------------------------
// courses

pub async fn find_course(
    conn: &mut SqliteConnection,
    owner_id: i64,
    id: &str,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE owner_id = ?1 AND id = ?2")
        .bind(owner_id)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn insert_course(
    conn: &mut SqliteConnection,
    owner_id: i64,
    course: &ScrapedCourse,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO courses
            (id, owner_id, name, course_code, term_name, teacher, dept_name, pic_url,
            description, last_updated)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&course.site_id)
    .bind(owner_id)
    .bind(&course.name)
    .bind(&course.course_code)
    .bind(&course.term_name)
    .bind(&course.teacher_name)
    .bind(&course.dept_name)
    .bind(&course.pic_url)
    .bind(&course.description)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn update_course(
    conn: &mut SqliteConnection,
    owner_id: i64,
    course: &ScrapedCourse,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE courses
        SET name = ?1, course_code = ?2, term_name = ?3, teacher = ?4, dept_name = ?5,
            pic_url = ?6, description = ?7, last_updated = ?8
        WHERE owner_id = ?9 AND id = ?10
        "#,
    )
    .bind(&course.name)
    .bind(&course.course_code)
    .bind(&course.term_name)
    .bind(&course.teacher_name)
    .bind(&course.dept_name)
    .bind(&course.pic_url)
    .bind(&course.description)
    .bind(Utc::now())
    .bind(owner_id)
    .bind(&course.site_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn find_resource(
    conn: &mut SqliteConnection,
    owner_id: i64,
    id: &str,
) -> Result<Option<CourseResource>, sqlx::Error> {
    sqlx::query_as::<_, CourseResource>(
        "SELECT * FROM course_resources WHERE owner_id = ?1 AND id = ?2",
    )
    .bind(owner_id)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn insert_resource(
    conn: &mut SqliteConnection,
    owner_id: i64,
    course_id: &str,
    resource: &ScrapedResource,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO course_resources
            (id, owner_id, course_id, title, file_type, file_size, download_url,
            parent_section, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&resource.resource_id)
    .bind(owner_id)
    .bind(course_id)
    .bind(&resource.title)
    .bind(&resource.file_type)
    .bind(&resource.file_size)
    .bind(&resource.download_url)
    .bind(&resource.parent_section)
    .bind(resource.upload_time)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn update_resource(
    conn: &mut SqliteConnection,
    owner_id: i64,
    course_id: &str,
    resource: &ScrapedResource,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE course_resources
        SET course_id = ?1, title = ?2, file_type = ?3, file_size = ?4, download_url = ?5,
            parent_section = ?6, created_at = ?7
        WHERE owner_id = ?8 AND id = ?9
        "#,
    )
    .bind(course_id)
    .bind(&resource.title)
    .bind(&resource.file_type)
    .bind(&resource.file_size)
    .bind(&resource.download_url)
    .bind(&resource.parent_section)
    .bind(resource.upload_time)
    .bind(owner_id)
    .bind(&resource.resource_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn list_courses(db: &SqlitePool, owner_id: i64) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT * FROM courses WHERE owner_id = ?1 ORDER BY term_name DESC, name",
    )
    .bind(owner_id)
    .fetch_all(db)
    .await
}

pub async fn get_course(
    db: &SqlitePool,
    owner_id: i64,
    id: &str,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE owner_id = ?1 AND id = ?2")
        .bind(owner_id)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn list_course_resources(
    db: &SqlitePool,
    owner_id: i64,
    course_id: &str,
) -> Result<Vec<CourseResource>, sqlx::Error> {
    sqlx::query_as::<_, CourseResource>(
        r#"
        SELECT * FROM course_resources
        WHERE owner_id = ?1 AND course_id = ?2
        ORDER BY parent_section, title
        "#,
    )
    .bind(owner_id)
    .bind(course_id)
    .fetch_all(db)
    .await
}

// ---------------------------------------------------------------------------
// discussions

pub async fn find_topic(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<DiscussionTopic>, sqlx::Error> {
    sqlx::query_as::<_, DiscussionTopic>("SELECT * FROM discussion_topics WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn insert_topic(
    conn: &mut SqliteConnection,
    topic: &ScrapedTopic,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO discussion_topics
            (id, course_id, title, author_name, content, view_count, reply_count,
            like_count, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&topic.id)
    .bind(&topic.course_id)
    .bind(&topic.title)
    .bind(&topic.author_name)
    .bind(&topic.content)
    .bind(topic.view_count)
    .bind(topic.reply_count)
    .bind(topic.like_count)
    .bind(topic.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn update_topic_counters(
    conn: &mut SqliteConnection,
    topic: &ScrapedTopic,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE discussion_topics
        SET view_count = ?1, reply_count = ?2, like_count = ?3
        WHERE id = ?4
        "#,
    )
    .bind(topic.view_count)
    .bind(topic.reply_count)
    .bind(topic.like_count)
    .bind(&topic.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn post_exists(conn: &mut SqliteConnection, id: &str) -> Result<bool, sqlx::Error> {
    let found: Option<(String,)> = sqlx::query_as("SELECT id FROM discussion_posts WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

pub async fn insert_post(
    conn: &mut SqliteConnection,
    topic_id: &str,
    post: &ScrapedPost,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO discussion_posts (id, topic_id, author_name, content, floor, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&post.id)
    .bind(topic_id)
    .bind(&post.author_name)
    .bind(&post.content)
    .bind(post.floor)
    .bind(post.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn list_topics(
    db: &SqlitePool,
    course_id: &str,
) -> Result<Vec<DiscussionTopic>, sqlx::Error> {
    sqlx::query_as::<_, DiscussionTopic>(
        r#"
        SELECT * FROM discussion_topics
        WHERE course_id = ?1
        ORDER BY created_at IS NULL, created_at DESC, id
        "#,
    )
    .bind(course_id)
    .fetch_all(db)
    .await
}

pub async fn get_topic(db: &SqlitePool, id: &str) -> Result<Option<DiscussionTopic>, sqlx::Error> {
    sqlx::query_as::<_, DiscussionTopic>("SELECT * FROM discussion_topics WHERE id = ?1")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn list_posts(
    db: &SqlitePool,
    topic_id: &str,
) -> Result<Vec<DiscussionPost>, sqlx::Error> {
    sqlx::query_as::<_, DiscussionPost>(
        "SELECT * FROM discussion_posts WHERE topic_id = ?1 ORDER BY floor, id",
    )
    .bind(topic_id)
    .fetch_all(db)
    .await
}

// ---------------------------------------------------------------------------
// notifications

pub async fn find_notification(
    conn: &mut SqliteConnection,
    owner_id: i64,
    id: &str,
) -> Result<Option<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE owner_id = ?1 AND id = ?2")
        .bind(owner_id)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn insert_notification(
    conn: &mut SqliteConnection,
    owner_id: i64,
    item: &ScrapedNotification,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO notifications
            (id, owner_id, title, content, msg_type, is_read, publish_time, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&item.id)
    .bind(owner_id)
    .bind(&item.title)
    .bind(&item.content)
    .bind(&item.msg_type)
    .bind(item.is_read)
    .bind(item.publish_time)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn update_notification_read(
    conn: &mut SqliteConnection,
    owner_id: i64,
    id: &str,
    is_read: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE notifications SET is_read = ?1 WHERE owner_id = ?2 AND id = ?3")
        .bind(is_read)
        .bind(owner_id)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn list_notifications(
    db: &SqlitePool,
    owner_id: i64,
) -> Result<Vec<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(
        r#"
        SELECT * FROM notifications
        WHERE owner_id = ?1
        ORDER BY publish_time IS NULL, publish_time DESC, id
        "#,
    )
    .bind(owner_id)
    .fetch_all(db)
    .await
}
