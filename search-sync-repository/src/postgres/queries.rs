//! Change-detection queries against the `content` schema.
//!
//! All three queries take a single `$1 = since` parameter, select rows with
//! `modified > since` and order ascending by `modified`. Embedded snapshots
//! are pre-aggregated into JSON arrays on the database side so each row
//! arrives self-contained.
//!
//! The queries rely on the source schema's trigger layer: any change to a
//! person or category also bumps `modified` on every work that embeds it, so
//! the works query re-pulls affected works without cross-stream joins here.

/// Works modified after `$1`, with categories and per-role person snapshots.
pub const SELECT_UPDATED_WORKS: &str = r#"
SELECT
    w.id,
    w.title,
    w.description,
    w.rating::float8 AS rating,
    w.modified,
    COALESCE(
        json_agg(
            DISTINCT jsonb_build_object(
                'id', c.id,
                'name', c.name
            )
        ) FILTER (WHERE c.id IS NOT NULL),
        '[]'
    ) AS categories,
    COALESCE(
        json_agg(
            DISTINCT jsonb_build_object(
                'id', p.id,
                'name', p.full_name
            )
        ) FILTER (WHERE p.id IS NOT NULL AND pw.role = 'director'),
        '[]'
    ) AS directors,
    COALESCE(
        json_agg(
            DISTINCT jsonb_build_object(
                'id', p.id,
                'name', p.full_name
            )
        ) FILTER (WHERE p.id IS NOT NULL AND pw.role = 'actor'),
        '[]'
    ) AS actors,
    COALESCE(
        json_agg(
            DISTINCT jsonb_build_object(
                'id', p.id,
                'name', p.full_name
            )
        ) FILTER (WHERE p.id IS NOT NULL AND pw.role = 'writer'),
        '[]'
    ) AS writers
FROM content.work w
LEFT JOIN content.person_work pw ON pw.work_id = w.id
LEFT JOIN content.person p ON p.id = pw.person_id
LEFT JOIN content.category_work cw ON cw.work_id = w.id
LEFT JOIN content.category c ON c.id = cw.category_id
WHERE w.modified > $1
GROUP BY w.id
ORDER BY w.modified
"#;

/// People modified after `$1`, with their role set per work.
pub const SELECT_UPDATED_PEOPLE: &str = r#"
SELECT
    p.id,
    p.full_name,
    p.modified,
    COALESCE(
        json_agg(
            DISTINCT jsonb_build_object(
                'id', w.id,
                'roles', pr.roles
            )
        ) FILTER (WHERE w.id IS NOT NULL),
        '[]'
    ) AS films
FROM content.person p
LEFT JOIN (
    SELECT
        pw.person_id,
        pw.work_id,
        array_agg(DISTINCT pw.role) AS roles
    FROM content.person_work pw
    GROUP BY pw.person_id, pw.work_id
) pr ON pr.person_id = p.id
LEFT JOIN content.work w ON w.id = pr.work_id
WHERE p.modified > $1
GROUP BY p.id
ORDER BY p.modified
"#;

/// Categories modified after `$1`.
pub const SELECT_UPDATED_CATEGORIES: &str = r#"
SELECT
    c.id,
    c.name,
    c.modified
FROM content.category c
WHERE c.modified > $1
ORDER BY c.modified
"#;
