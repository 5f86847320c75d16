//! Full lifecycle walkthrough against a local MongoDB instance
//!
//! Run with a server listening on localhost:27017:
//!
//! ```sh
//! cargo run --example lifecycle
//! ```

use std::sync::Arc;

use bson::doc;
use corral_mongodb::{
    document_to_json, DatabaseOptions, ModelDef, MongoDatabase, MongoDriver, Schema,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    let driver = Arc::new(MongoDriver::new());
    let database = MongoDatabase::new(
        DatabaseOptions::new("mongodb://localhost:27017/corral-demo")
            .driver(driver.clone())
            .connect_options(doc! { "appName": "corral-demo", "connectTimeoutMS": 2000 }),
    );

    database.connect().await?;
    println!("ready: {}", database.is_ready());

    let user = database.model(
        ModelDef::new("User").schema(
            Schema::builder()
                .field("name", doc! { "type": "string", "required": true })
                .field("email", doc! { "type": "string", "unique": true })
                .build(),
        ),
    )?;
    println!("registered model: {}", user.name());

    // Data operations go straight to the driver collection
    let db = driver.database().expect("connected with a default database");
    let users = user.collection(&db);
    users
        .insert_one(doc! { "name": "Ada", "email": "ada@example.com", "__v": 0 })
        .await?;

    if let Some(found) = users.find_one(doc! { "name": "Ada" }).await? {
        println!("{}", document_to_json(&found));
    }

    database.disconnect().await?;
    println!("ready: {}", database.is_ready());
    Ok(())
}
