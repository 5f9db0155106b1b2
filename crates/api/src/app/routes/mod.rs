use axum::Router;

use caregate_auth::{Controller, RouteTable, RouteTableError};

pub mod admin;
pub mod auth;
pub mod financials;
pub mod internal;
pub mod me;
pub mod patients;
pub mod system;

type Mount = fn(&str) -> (Controller, Router);

const MOUNTS: [Mount; 7] = [
    system::routes,
    auth::routes,
    me::routes,
    patients::routes,
    financials::routes,
    admin::routes,
    internal::routes,
];

/// Router for every endpoint plus the route table describing how each one is
/// guarded. Paths are registered in full so the route table and the router
/// agree on route identity.
pub fn build(prefix: &str) -> Result<(Router, RouteTable), RouteTableError> {
    let mut router = Router::new();
    let mut table = RouteTable::new();

    for mount in MOUNTS {
        let (controller, routes) = mount(prefix);
        table.register(controller)?;
        router = router.merge(routes);
    }

    Ok((router, table))
}
