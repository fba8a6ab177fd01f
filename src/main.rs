use actix_web::{delete, get, post, put, web, App, HttpResponse, HttpServer};
use mongodb::Client;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

mod balance;
mod error;
mod expense;
mod member;
mod money;
mod schemas;
mod settlement;
mod store;

use error::Error;
use expense::NewExpense;
use schemas::Dashboard;

#[derive(Deserialize, Serialize)]
struct NewUserJson {
    username: String,
    name: String,
}

#[post("/api/user")]
async fn create_user(
    client: web::Data<Client>,
    json: web::Json<NewUserJson>,
) -> Result<HttpResponse, Error> {
    let details = json.into_inner();
    info!(username = %details.username, "registering user");
    let dashboard = Dashboard::new(&details.username, &details.name);
    store::create(&client, &dashboard).await?;
    Ok(HttpResponse::Created().json(dashboard))
}

#[get("/api/user/all")]
async fn list_users(client: web::Data<Client>) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(store::usernames(&client).await?))
}

#[delete("/api/user/{username}")]
async fn delete_user(
    client: web::Data<Client>,
    username: web::Path<String>,
) -> Result<HttpResponse, Error> {
    info!(username = %username, "deleting user and dashboard");
    store::delete(&client, &username).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/api/dashboard/{username}/total-sum")]
async fn total_sum(
    client: web::Data<Client>,
    username: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let dashboard = store::load(&client, &username).await?;
    Ok(HttpResponse::Ok().json(balance::total_sum(&dashboard)))
}

#[get("/api/dashboard/{username}/sum-by-type")]
async fn sum_by_type(
    client: web::Data<Client>,
    username: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let dashboard = store::load(&client, &username).await?;
    Ok(HttpResponse::Ok().json(balance::sum_by_type(&dashboard)))
}

#[get("/api/dashboard/{username}/count-by-type")]
async fn count_by_type(
    client: web::Data<Client>,
    username: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let dashboard = store::load(&client, &username).await?;
    Ok(HttpResponse::Ok().json(balance::count_by_type(&dashboard)))
}

#[get("/api/dashboard/{username}/count-total")]
async fn count_total(
    client: web::Data<Client>,
    username: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let dashboard = store::load(&client, &username).await?;
    Ok(HttpResponse::Ok().json(dashboard.expenses.len()))
}

#[get("/api/dashboard/{username}/balances")]
async fn net_balances(
    client: web::Data<Client>,
    username: web::Path<String>,
) -> Result<HttpResponse, Error> {
    info!(username = %username, "calculating net balances");
    let dashboard = store::load(&client, &username).await?;
    Ok(HttpResponse::Ok().json(balance::net_balances(&dashboard)))
}

#[get("/api/dashboard/{username}/settle")]
async fn settle_balances(
    client: web::Data<Client>,
    username: web::Path<String>,
) -> Result<HttpResponse, Error> {
    info!(username = %username, "calculating settlement instructions");
    let dashboard = store::load(&client, &username).await?;
    Ok(HttpResponse::Ok().json(settlement::settle_dashboard(&dashboard)))
}

#[get("/api/dashboard/{username}/expenses")]
async fn list_expenses(
    client: web::Data<Client>,
    username: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let dashboard = store::load(&client, &username).await?;
    Ok(HttpResponse::Ok().json(dashboard.expenses))
}

#[delete("/api/dashboard/{username}/reset")]
async fn reset_dashboard(
    client: web::Data<Client>,
    username: web::Path<String>,
) -> Result<HttpResponse, Error> {
    info!(username = %username, "resetting dashboard");
    let mut dashboard = store::load(&client, &username).await?;
    dashboard.reset();
    store::save(&client, &dashboard).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/api/expense/{username}")]
async fn add_expense(
    client: web::Data<Client>,
    username: web::Path<String>,
    json: web::Json<NewExpense>,
) -> Result<HttpResponse, Error> {
    let mut dashboard = store::load(&client, &username).await?;
    let expense = expense::add_expense(&mut dashboard, json.into_inner())?;
    store::save(&client, &dashboard).await?;
    Ok(HttpResponse::Created().json(expense))
}

#[get("/api/expense/{username}/{id}")]
async fn get_expense(
    client: web::Data<Client>,
    path: web::Path<(String, Uuid)>,
) -> Result<HttpResponse, Error> {
    let (username, id) = path.into_inner();
    let dashboard = store::load(&client, &username).await?;
    let expense = dashboard.expense(id).ok_or(Error::ExpenseNotFound)?;
    Ok(HttpResponse::Ok().json(expense))
}

#[put("/api/expense/{username}/{id}")]
async fn update_expense(
    client: web::Data<Client>,
    path: web::Path<(String, Uuid)>,
    json: web::Json<NewExpense>,
) -> Result<HttpResponse, Error> {
    let (username, id) = path.into_inner();
    let mut dashboard = store::load(&client, &username).await?;
    let expense = expense::update_expense(&mut dashboard, id, json.into_inner())?;
    store::save(&client, &dashboard).await?;
    Ok(HttpResponse::Ok().json(expense))
}

#[delete("/api/expense/{username}/{id}")]
async fn delete_expense(
    client: web::Data<Client>,
    path: web::Path<(String, Uuid)>,
) -> Result<HttpResponse, Error> {
    let (username, id) = path.into_inner();
    let mut dashboard = store::load(&client, &username).await?;
    expense::delete_expense(&mut dashboard, id)?;
    store::save(&client, &dashboard).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/api/group-members/{username}")]
async fn add_group_members(
    client: web::Data<Client>,
    username: web::Path<String>,
    json: web::Json<Vec<String>>,
) -> Result<HttpResponse, Error> {
    let mut dashboard = store::load(&client, &username).await?;
    let added = member::add_members(&mut dashboard, json.into_inner())?;
    store::save(&client, &dashboard).await?;
    Ok(HttpResponse::Created().json(added))
}

#[get("/api/group-members/{username}")]
async fn list_group_members(
    client: web::Data<Client>,
    username: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let dashboard = store::load(&client, &username).await?;
    Ok(HttpResponse::Ok().json(member::member_names(&dashboard)))
}

#[delete("/api/group-members/{username}/{member}")]
async fn remove_group_member(
    client: web::Data<Client>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, Error> {
    let (username, member_name) = path.into_inner();
    let mut dashboard = store::load(&client, &username).await?;
    member::remove_member(&mut dashboard, &member_name)?;
    store::save(&client, &dashboard).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "splitshare=info,actix_web=info".into()),
        )
        .init();

    let uri = std::env::var("MONGODB_URI").expect("You need to add the MONGODB_URI to the env");
    info!("Using the following URI: {}", uri);

    let client = Client::with_uri_str(uri).await.expect("failed to connect");
    store::ensure_username_index(&client)
        .await
        .expect("failed to create the username index");
    info!("Connected");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(client.clone()))
            .service(create_user)
            .service(list_users)
            .service(delete_user)
            .service(total_sum)
            .service(sum_by_type)
            .service(count_by_type)
            .service(count_total)
            .service(net_balances)
            .service(settle_balances)
            .service(list_expenses)
            .service(reset_dashboard)
            .service(add_expense)
            .service(get_expense)
            .service(update_expense)
            .service(delete_expense)
            .service(add_group_members)
            .service(list_group_members)
            .service(remove_group_member)
    })
    .bind(("0.0.0.0", 8080))?
    .run()
    .await
}
