//! Class universes used across the integration tests
//!
//! Every program has a static `Lapp/Main.run(..)` entry point whose stream
//! parameters receive placeholder objects from the engine.

use super::builders::{empty_method, BodyBuilder};
use codegraph_serialization::shared::models::names::{
    default_constructor, read_object_callback, read_object_entry_method,
    read_object_no_data_callback, read_resolve_callback, validate_object_callback,
    write_object_callback, write_object_entry_method, write_replace_callback,
    JAVA_IO_SERIALIZABLE,
};
use codegraph_serialization::{
    ClassHierarchy, ClassInfo, FieldRef, MethodInfo, MethodRef, Selector, TypeRef,
};

pub const MAIN: &str = "Lapp/Main";
pub const PAYLOAD: &str = "Lapp/Payload";
pub const OUTER: &str = "Lapp/Outer";
pub const INNER: &str = "Lapp/Inner";
pub const HOLDER: &str = "Lapp/Holder";
pub const SHAPE: &str = "Lapp/Shape";
pub const CIRCLE: &str = "Lapp/Circle";
pub const SQUARE: &str = "Lapp/Square";
pub const ANIMAL: &str = "Lapp/zoo/Animal";
pub const CAT: &str = "Lapp/zoo/Cat";
pub const ZOO: &str = "Lapp/zoo/Zoo";
pub const UTIL: &str = "Llib/Util";
pub const BAG: &str = "Lapp/Bag";
pub const PLAIN: &str = "Lapp/Plain";

/// `run(ObjectOutputStream, ObjectInputStream)`
pub const RUN_BOTH: &str = "(Ljava/io/ObjectOutputStream;Ljava/io/ObjectInputStream;)V";
/// `run(ObjectOutputStream)`
pub const RUN_WRITE: &str = "(Ljava/io/ObjectOutputStream;)V";
/// `run(ObjectInputStream)`
pub const RUN_READ: &str = "(Ljava/io/ObjectInputStream;)V";

pub fn main_run(descriptor: &str) -> MethodRef {
    MethodRef::new(TypeRef::new(MAIN), Selector::new("run", descriptor))
}

pub fn method_of(owner: &str, selector: Selector) -> MethodRef {
    MethodRef::new(TypeRef::new(owner), selector)
}

fn main_class(descriptor: &str, body: BodyBuilder) -> ClassInfo {
    ClassInfo::new(MAIN).method(
        MethodInfo::new(&TypeRef::new(MAIN), Selector::new("run", descriptor))
            .static_method()
            .with_body(body.build()),
    )
}

/// Serializable application class with a constructor and the given callbacks
pub fn serializable_class(name: &str, callbacks: &[Selector]) -> ClassInfo {
    let mut class = ClassInfo::new(name)
        .implements(JAVA_IO_SERIALIZABLE)
        .method(empty_method(name, default_constructor()));
    for selector in callbacks {
        class = class.method(empty_method(name, selector.clone()));
    }
    class
}

pub fn all_write_callbacks() -> Vec<Selector> {
    vec![write_replace_callback(), write_object_callback()]
}

pub fn all_read_callbacks() -> Vec<Selector> {
    vec![
        read_object_callback(),
        read_object_no_data_callback(),
        read_resolve_callback(),
        validate_object_callback(),
    ]
}

/// `out.writeObject(new Payload()); (Payload) in.readObject();`
///
/// Payload declares all six lifecycle callbacks.
pub fn lifecycle_program() -> ClassHierarchy {
    let mut callbacks = all_write_callbacks();
    callbacks.extend(all_read_callbacks());

    let mut cha = ClassHierarchy::with_primordial_stubs();
    cha.add_class(serializable_class(PAYLOAD, &callbacks));
    cha.add_class(main_class(
        RUN_BOTH,
        BodyBuilder::new(2)
            .new_object(3, PAYLOAD)
            .call(write_object_entry_method(), vec![1, 3], 4)
            .call_with_result(5, read_object_entry_method(), vec![2], 6)
            .cast(7, 5, PAYLOAD)
            .return_void(),
    ));
    cha
}

pub fn outer_inner_field() -> FieldRef {
    FieldRef::new(TypeRef::new(OUTER), "inner", TypeRef::new(INNER))
}

/// `o = new Outer(); o.inner = new Inner(); out.writeObject(o); (Outer) in.readObject();`
///
/// Only Inner declares callbacks.
pub fn nested_program() -> ClassHierarchy {
    let mut cha = ClassHierarchy::with_primordial_stubs();
    cha.add_class(serializable_class(
        INNER,
        &[write_object_callback(), read_object_callback()],
    ));
    cha.add_class(serializable_class(OUTER, &[]).field("inner", INNER));
    cha.add_class(main_class(
        RUN_BOTH,
        BodyBuilder::new(2)
            .new_object(3, OUTER)
            .new_object(4, INNER)
            .put_field(3, outer_inner_field(), 4)
            .call(write_object_entry_method(), vec![1, 3], 5)
            .call_with_result(6, read_object_entry_method(), vec![2], 7)
            .cast(8, 6, OUTER)
            .return_void(),
    ));
    cha
}

/// `(Holder) in.readObject()`, where `Holder.readObject(in)` calls
/// `in.readObject()` again without casting the result
pub fn fallback_program() -> ClassHierarchy {
    let mut cha = ClassHierarchy::with_primordial_stubs();
    let callback_body = BodyBuilder::new(2)
        .call_with_result(3, read_object_entry_method(), vec![2], 4)
        .return_void()
        .build();
    cha.add_class(
        ClassInfo::new(HOLDER)
            .implements(JAVA_IO_SERIALIZABLE)
            .method(empty_method(HOLDER, default_constructor()))
            .method(
                MethodInfo::new(&TypeRef::new(HOLDER), read_object_callback())
                    .with_body(callback_body),
            )
            .method(empty_method(HOLDER, read_resolve_callback())),
    );
    cha.add_class(main_class(
        RUN_READ,
        BodyBuilder::new(1)
            .call_with_result(2, read_object_entry_method(), vec![1], 3)
            .cast(4, 2, HOLDER)
            .return_void(),
    ));
    cha
}

pub fn bag_item_field() -> FieldRef {
    FieldRef::new(TypeRef::new(BAG), "item", TypeRef::new(INNER))
}

/// `(Bag) in.readObject()`, where `Bag extends ArrayList` holds `item: Inner`
/// and `Bag.readObject(in)` calls `in.readObject()` without casting
pub fn collection_fallback_program() -> ClassHierarchy {
    let mut cha = ClassHierarchy::with_primordial_stubs();
    cha.add_class(serializable_class(INNER, &[read_object_callback()]));
    let callback_body = BodyBuilder::new(2)
        .call_with_result(3, read_object_entry_method(), vec![2], 4)
        .return_void()
        .build();
    cha.add_class(
        ClassInfo::new(BAG)
            .extends("Ljava/util/ArrayList")
            .field("item", INNER)
            .method(empty_method(BAG, default_constructor()))
            .method(
                MethodInfo::new(&TypeRef::new(BAG), read_object_callback())
                    .with_body(callback_body),
            ),
    );
    cha.add_class(main_class(
        RUN_READ,
        BodyBuilder::new(1)
            .call_with_result(2, read_object_entry_method(), vec![1], 3)
            .cast(4, 2, BAG)
            .return_void(),
    ));
    cha
}

/// `(Plain) in.readObject()`; Plain does not implement Serializable
pub fn plain_cast_program() -> ClassHierarchy {
    let mut cha = ClassHierarchy::with_primordial_stubs();
    cha.add_class(ClassInfo::new(PLAIN).method(empty_method(PLAIN, default_constructor())));
    cha.add_class(main_class(
        RUN_READ,
        BodyBuilder::new(1)
            .call_with_result(2, read_object_entry_method(), vec![1], 3)
            .cast(4, 2, PLAIN)
            .return_void(),
    ));
    cha
}

/// `(Shape) in.readObject()` with two concrete shapes
pub fn polymorphic_program() -> ClassHierarchy {
    let mut cha = ClassHierarchy::with_primordial_stubs();
    cha.add_class(
        ClassInfo::new(SHAPE)
            .interface()
            .implements(JAVA_IO_SERIALIZABLE),
    );
    for shape in [CIRCLE, SQUARE] {
        cha.add_class(serializable_class(shape, &[read_resolve_callback()]).implements(SHAPE));
    }
    cha.add_class(main_class(
        RUN_READ,
        BodyBuilder::new(1)
            .call_with_result(2, read_object_entry_method(), vec![1], 3)
            .cast(4, 2, SHAPE)
            .return_void(),
    ));
    cha
}

/// `(Zoo) in.readObject()`; `Zoo.pet` is an `Animal`
///
/// Cat is the only application animal; `library_animals` more come from a
/// library. Every animal declares `readObject`.
pub fn zoo_program(library_animals: usize) -> ClassHierarchy {
    let mut cha = ClassHierarchy::with_primordial_stubs();
    cha.add_class(
        ClassInfo::new(ANIMAL)
            .interface()
            .implements(JAVA_IO_SERIALIZABLE),
    );
    cha.add_class(serializable_class(CAT, &[read_object_callback()]).implements(ANIMAL));
    for i in 0..library_animals {
        let name = format!("Llib/animals/Animal{}", i);
        cha.add_class(
            serializable_class(&name, &[read_object_callback()])
                .implements(ANIMAL)
                .primordial(),
        );
    }
    cha.add_class(serializable_class(ZOO, &[]).field("pet", ANIMAL));
    cha.add_class(main_class(
        RUN_READ,
        BodyBuilder::new(1)
            .call_with_result(2, read_object_entry_method(), vec![1], 3)
            .cast(4, 2, ZOO)
            .return_void(),
    ));
    cha
}

/// `zoo_program`, but the entry casts straight to `Animal`
pub fn animal_cast_program(library_animals: usize) -> ClassHierarchy {
    let mut cha = zoo_program(library_animals);
    cha.add_class(main_class(
        RUN_READ,
        BodyBuilder::new(1)
            .call_with_result(2, read_object_entry_method(), vec![1], 3)
            .cast(4, 2, ANIMAL)
            .return_void(),
    ));
    cha
}

/// `Util.save(out, new Payload())` where the library method does the write
pub fn library_caller_program() -> ClassHierarchy {
    let mut cha = ClassHierarchy::with_primordial_stubs();
    cha.add_class(serializable_class(PAYLOAD, &[write_object_callback()]));
    let save = Selector::new("save", "(Ljava/io/ObjectOutputStream;Ljava/lang/Object;)V");
    cha.add_class(
        ClassInfo::new(UTIL).primordial().method(
            MethodInfo::new(&TypeRef::new(UTIL), save.clone())
                .static_method()
                .with_body(
                    BodyBuilder::new(2)
                        .call(write_object_entry_method(), vec![1, 2], 3)
                        .return_void()
                        .build(),
                ),
        ),
    );
    cha.add_class(main_class(
        RUN_WRITE,
        BodyBuilder::new(1)
            .new_object(2, PAYLOAD)
            .call_static(method_of(UTIL, save), vec![1, 2], 3)
            .return_void(),
    ));
    cha
}

/// Two `writeObject` calls on different lines of the same method
pub fn two_writes_program() -> ClassHierarchy {
    let mut cha = ClassHierarchy::with_primordial_stubs();
    cha.add_class(serializable_class(PAYLOAD, &[write_object_callback()]));
    cha.add_class(main_class(
        RUN_WRITE,
        BodyBuilder::new(1)
            .new_object(2, PAYLOAD)
            .call(write_object_entry_method(), vec![1, 2], 3)
            .call(write_object_entry_method(), vec![1, 2], 4)
            .return_void(),
    ));
    cha
}
