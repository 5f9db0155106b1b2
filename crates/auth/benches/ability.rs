use criterion::{Criterion, black_box, criterion_group, criterion_main};

use caregate_auth::{AbilityFactory, Action, DefaultPermissions, Resource, UserType};

fn bench_build(c: &mut Criterion) {
    let factory = AbilityFactory::new();
    let permissions = DefaultPermissions::for_user_type(UserType::Nutritionist);

    c.bench_function("ability_build_nutritionist", |b| {
        b.iter(|| factory.build(black_box(&permissions)))
    });
}

fn bench_can(c: &mut Criterion) {
    let ability = AbilityFactory::new().build(&DefaultPermissions::for_user_type(UserType::Secretary));

    c.bench_function("ability_can_full_catalog", |b| {
        b.iter(|| {
            let mut granted = 0usize;
            for resource in Resource::CATALOG {
                for action in Action::ALL {
                    if ability.can(black_box(action), &resource) {
                        granted += 1;
                    }
                }
            }
            granted
        })
    });
}

criterion_group!(benches, bench_build, bench_can);
criterion_main!(benches);
