use sqlx::{FromRow, SqlitePool};

use crate::error::ApiError;
use crate::geometry::dto::{MarkerDto, PolygonDto};

#[derive(Debug, FromRow)]
struct PolygonRow {
    coords: String,
    label: String,
}

/// Markers for one user, in insertion order of the last save.
pub async fn list_markers(db: &SqlitePool, user_id: i64) -> Result<Vec<MarkerDto>, ApiError> {
    let rows = sqlx::query_as::<_, MarkerDto>(
        r#"
        SELECT lat, lng
        FROM markers
        WHERE user_id = ?
        ORDER BY id
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Replaces the user's entire marker set in one transaction. The delete and
/// the inserts never interleave with another save for the same user.
pub async fn replace_markers(
    db: &SqlitePool,
    user_id: i64,
    markers: &[MarkerDto],
) -> Result<(), ApiError> {
    let mut tx = db.begin().await?;
    sqlx::query("DELETE FROM markers WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    for marker in markers {
        sqlx::query("INSERT INTO markers (user_id, lat, lng) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(marker.lat)
            .bind(marker.lng)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// Polygons for one user, coords parsed back from their stored JSON text.
pub async fn list_polygons(db: &SqlitePool, user_id: i64) -> Result<Vec<PolygonDto>, ApiError> {
    let rows = sqlx::query_as::<_, PolygonRow>(
        r#"
        SELECT coords, label
        FROM polygons
        WHERE user_id = ?
        ORDER BY id
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    rows.into_iter()
        .map(|row| {
            let coords = serde_json::from_str(&row.coords)
                .map_err(|e| ApiError::Storage(sqlx::Error::Decode(e.into())))?;
            Ok(PolygonDto {
                coords,
                label: row.label,
            })
        })
        .collect()
}

/// Full-replace save for polygons, same transactional shape as markers.
pub async fn replace_polygons(
    db: &SqlitePool,
    user_id: i64,
    polygons: &[PolygonDto],
) -> Result<(), ApiError> {
    let mut tx = db.begin().await?;
    sqlx::query("DELETE FROM polygons WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    for polygon in polygons {
        let coords = serde_json::to_string(&polygon.coords)
            .map_err(|e| ApiError::Internal(e.into()))?;
        sqlx::query("INSERT INTO polygons (user_id, coords, label) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(coords)
            .bind(&polygon.label)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::User;
    use crate::db;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn pool_with_user(username: &str) -> (SqlitePool, i64) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        db::bootstrap(&pool).await.expect("bootstrap schema");
        let user = User::create(&pool, username, "hash").await.expect("user");
        (pool, user.id)
    }

    #[tokio::test]
    async fn replace_then_list_preserves_order() {
        let (pool, uid) = pool_with_user("alice").await;
        let markers = vec![
            MarkerDto { lat: 51.5, lng: -0.09 },
            MarkerDto { lat: 48.85, lng: 2.35 },
            MarkerDto { lat: 40.71, lng: -74.0 },
        ];
        replace_markers(&pool, uid, &markers).await.expect("save");
        let fetched = list_markers(&pool, uid).await.expect("list");
        assert_eq!(fetched, markers);
    }

    #[tokio::test]
    async fn replace_discards_previous_set() {
        let (pool, uid) = pool_with_user("alice").await;
        replace_markers(&pool, uid, &[MarkerDto { lat: 1.0, lng: 2.0 }])
            .await
            .expect("first save");
        replace_markers(&pool, uid, &[MarkerDto { lat: 3.0, lng: 4.0 }])
            .await
            .expect("second save");
        let fetched = list_markers(&pool, uid).await.expect("list");
        assert_eq!(fetched, vec![MarkerDto { lat: 3.0, lng: 4.0 }]);
    }

    #[tokio::test]
    async fn empty_replace_empties_only_that_user() {
        let (pool, alice) = pool_with_user("alice").await;
        let bob = User::create(&pool, "bob", "hash").await.expect("user").id;

        replace_markers(&pool, alice, &[MarkerDto { lat: 1.0, lng: 1.0 }])
            .await
            .expect("alice save");
        replace_markers(&pool, bob, &[MarkerDto { lat: 2.0, lng: 2.0 }])
            .await
            .expect("bob save");

        replace_markers(&pool, alice, &[]).await.expect("clear");
        assert!(list_markers(&pool, alice).await.expect("list").is_empty());
        assert_eq!(
            list_markers(&pool, bob).await.expect("list"),
            vec![MarkerDto { lat: 2.0, lng: 2.0 }]
        );
    }

    #[tokio::test]
    async fn polygons_roundtrip_coords_and_label() {
        let (pool, uid) = pool_with_user("alice").await;
        let polygons = vec![
            PolygonDto {
                coords: vec![[51.5, -0.09], [51.6, -0.1], [51.55, -0.12]],
                label: "park".into(),
            },
            PolygonDto {
                coords: vec![[10.0, 20.0], [11.0, 21.0], [12.0, 19.0]],
                label: String::new(),
            },
        ];
        replace_polygons(&pool, uid, &polygons).await.expect("save");
        let fetched = list_polygons(&pool, uid).await.expect("list");
        assert_eq!(fetched, polygons);
    }

    #[tokio::test]
    async fn unparseable_coords_surface_as_storage_error() {
        let (pool, uid) = pool_with_user("alice").await;
        sqlx::query("INSERT INTO polygons (user_id, coords, label) VALUES (?, ?, ?)")
            .bind(uid)
            .bind("not-json")
            .bind("")
            .execute(&pool)
            .await
            .expect("raw insert");
        let err = list_polygons(&pool, uid).await.unwrap_err();
        assert!(matches!(err, ApiError::Storage(_)));
    }
}
